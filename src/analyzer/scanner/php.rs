//! PHP-lite Scanner
//!
//! Line-oriented extraction of namespaces, `use` imports, constants,
//! class-likes, functions/methods and `->`/`::` call hints.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::common::{
    BlockTracker, MaskOptions, Scope, classify_callable, collapse_whitespace, enclosing_container,
    mask_source, paren_args,
};
use crate::constants::scanner::{CALL_HINTS_PER_FILE, CALL_HINTS_PER_SCOPE};
use crate::types::{Declaration, DeclarationKind, LiteLanguage, Modifier, Outline};

mod patterns {
    use super::*;

    pub static NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*namespace\s+([A-Za-z_\\][\w\\]*)\s*([;{])").expect("namespace regex")
    });
    pub static USE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*use\s+(?:(function|const)\s+)?([^;]+);").expect("use regex")
    });
    pub static CONST: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*((?:(?:public|protected|private|final)\s+)*)const\s+(?:[A-Za-z_?\\][\w\\|?]*\s+)?([A-Za-z_]\w*)\s*=")
            .expect("const regex")
    });
    pub static DEFINE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"\bdefine\s*\(\s*['"]([A-Za-z_]\w*)['"]"#).expect("define regex")
    });
    pub static CLASS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*((?:(?:abstract|final|readonly)\s+)*)(class|interface|trait|enum)\s+([A-Za-z_]\w*)")
            .expect("class regex")
    });
    pub static EXTENDS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\bextends\s+([\w\\]+(?:\s*,\s*[\w\\]+)*)").expect("extends regex")
    });
    pub static IMPLEMENTS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\bimplements\s+([\w\\]+(?:\s*,\s*[\w\\]+)*)").expect("implements regex")
    });
    pub static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*((?:(?:public|protected|private|static|abstract|final)\s+)*)function\s+&?\s*([A-Za-z_]\w*)\s*\(")
            .expect("function regex")
    });
    pub static RETURN_TYPE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*:\s*(\??[\w\\|?]+)").expect("return type regex")
    });
    pub static CALL_HINT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(->|::)\s*([A-Za-z_]\w*)\s*\(").expect("call hint regex")
    });
}

/// Per-scope and per-file call hint budget
#[derive(Debug, Default)]
struct CallHintBudget {
    seen: HashSet<(Option<Scope>, String)>,
    per_scope: HashMap<Option<Scope>, usize>,
    total: usize,
}

impl CallHintBudget {
    fn admit(&mut self, scope: Option<Scope>, key: String) -> bool {
        if self.total >= CALL_HINTS_PER_FILE {
            return false;
        }
        let count = self.per_scope.entry(scope).or_default();
        if *count >= CALL_HINTS_PER_SCOPE || !self.seen.insert((scope, key)) {
            return false;
        }
        *count += 1;
        self.total += 1;
        true
    }
}

fn keyword_modifiers(keywords: &str) -> impl Iterator<Item = Modifier> + '_ {
    keywords.split_whitespace().filter_map(Modifier::from_keyword)
}

/// Offset just past the first `{` at or after `from`, when code follows it
fn body_split(line: &str, from: usize) -> Option<usize> {
    let brace = from + line.get(from..)?.find('{')?;
    let rest = line.get(brace + 1..)?;
    (!rest.trim().is_empty()).then_some(brace + 1)
}

/// Scan PHP source. Total: never panics, never fails.
pub fn scan_php(source: &str) -> Vec<Declaration> {
    let masked = mask_source(source, MaskOptions::for_language(LiteLanguage::Php));
    let mut outline = Outline::new();
    let mut tracker: BlockTracker<Scope> = BlockTracker::new();
    let mut file_namespace: Option<usize> = None;
    let mut hints = CallHintBudget::default();

    for (idx, (raw_line, masked_line)) in source.lines().zip(masked.lines()).enumerate() {
        let line_no = idx as u32 + 1;

        // Text after a header's `{` is scanned again as its own segment
        let mut start = 0;
        loop {
            let raw = raw_line.get(start..).unwrap_or_default();
            let line = masked_line.get(start..).unwrap_or_default();
            let mut body_start: Option<usize> = None;
            let container = enclosing_container(&tracker).or(file_namespace);

            if let Some(caps) = patterns::NAMESPACE.captures(line) {
                let decl = Declaration::new(DeclarationKind::Namespace, &caps[1], line_no);
                let ns = outline.push(decl);
                if &caps[2] == "{" {
                    file_namespace = None;
                    tracker.expect_block(Scope::Namespace(ns));
                    body_start = caps.get(2).and_then(|m| body_split(line, m.start()));
                } else {
                    file_namespace = Some(ns);
                }
            } else if let Some(caps) = patterns::USE.captures(line)
                && tracker.open_scopes().all(|s| matches!(s, Scope::Namespace(_)))
                && caps[2].contains('\\')
            {
                let mut decl =
                    Declaration::new(DeclarationKind::Import, collapse_whitespace(&caps[2]), line_no)
                        .with_parent(container);
                if let Some(kind) = caps.get(1) {
                    decl = decl.with_detail(kind.as_str());
                }
                outline.push(decl);
            } else if let Some(caps) = patterns::CLASS.captures(line) {
                let name_end = caps.get(3).map_or(line.len(), |m| m.end());
                let tail = &line[name_end..];
                let mut heritage = String::new();
                if let Some(ext) = patterns::EXTENDS.captures(tail) {
                    heritage.push_str(&format!(" extends {}", collapse_whitespace(&ext[1])));
                }
                if let Some(imp) = patterns::IMPLEMENTS.captures(tail) {
                    heritage.push_str(&format!(" implements {}", collapse_whitespace(&imp[1])));
                }

                let mut decl = Declaration::new(DeclarationKind::Class, &caps[3], line_no)
                    .with_detail(&caps[2])
                    .with_modifiers(keyword_modifiers(&caps[1]))
                    .with_parent(container);
                if !heritage.is_empty() {
                    decl = decl.with_signature(heritage);
                }
                let class = outline.push(decl);
                tracker.expect_block(Scope::Class(class));
                body_start = body_split(line, name_end);
            } else if let Some(caps) = patterns::FUNCTION.captures(line) {
                let open = caps.get(0).map_or(0, |m| m.end() - 1);
                let (args, after) = paren_args(raw, line, open);
                let mut signature = format!("({args})");
                if let Some(ret) = after
                    .and_then(|pos| line.get(pos..))
                    .and_then(|rest| patterns::RETURN_TYPE.captures(rest))
                {
                    signature.push_str(&format!(" : {}", &ret[1]));
                }

                let (kind, parent) = match classify_callable(&tracker) {
                    (kind, None) => (kind, file_namespace),
                    classified => classified,
                };
                let mut decl = Declaration::new(kind, &caps[2], line_no)
                    .with_signature(signature)
                    .with_modifiers(keyword_modifiers(&caps[1]))
                    .with_parent(parent);
                if kind == DeclarationKind::Method && !decl.modifiers.iter().any(Modifier::is_visibility)
                {
                    decl = decl.with_modifier(Modifier::Public);
                }
                let func = outline.push(decl);
                tracker.expect_block(Scope::Function(func));
            } else if let Some(caps) = patterns::CONST.captures(line) {
                outline.push(
                    Declaration::new(DeclarationKind::Constant, &caps[2], line_no)
                        .with_modifiers(keyword_modifiers(&caps[1]))
                        .with_parent(container),
                );
            } else if line.trim_start().starts_with('{') {
                // Allman brace with the body on the same line
                body_start = body_split(line, 0);
            }

            // Later segments are scanned on their own turn
            let end = body_start.unwrap_or(line.len());
            let (raw, line) = (raw.get(..end).unwrap_or(raw), &line[..end]);

            // Names come from the raw line; the masked line proves the call is code
            for caps in patterns::DEFINE.captures_iter(raw) {
                let Some(whole) = caps.get(0) else { continue };
                if line.get(whole.start()..).is_some_and(|s| s.starts_with("define")) {
                    outline.push(
                        Declaration::new(DeclarationKind::Constant, &caps[1], line_no)
                            .with_detail("define")
                            .with_parent(container),
                    );
                }
            }

            let scope = tracker.scopes().next().copied();
            let hint_parent = tracker.scopes().find_map(Scope::container).or(file_namespace);
            for caps in patterns::CALL_HINT.captures_iter(line) {
                let (op, name) = (&caps[1], &caps[2]);
                if hints.admit(scope, format!("{op}{name}")) {
                    outline.push(
                        Declaration::new(DeclarationKind::CallHint, name, line_no)
                            .with_signature(op)
                            .with_parent(hint_parent),
                    );
                }
            }

            match body_start {
                Some(offset) => {
                    tracker.feed_line(line);
                    start += offset;
                }
                None => {
                    tracker.feed_line(line);
                    break;
                }
            }
        }
    }

    outline.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(decls: &'a [Declaration], kind: DeclarationKind, name: &str) -> &'a Declaration {
        decls
            .iter()
            .find(|d| d.kind == kind && d.name == name)
            .unwrap_or_else(|| panic!("missing {kind} {name}"))
    }

    #[test]
    fn test_one_line_function() {
        let decls = scan_php("<?php function foo($a) { return $a; }");
        let foo = find(&decls, DeclarationKind::Function, "foo");
        assert_eq!(foo.start_line, 1);
        assert_eq!(foo.signature.as_deref(), Some("($a)"));
    }

    #[test]
    fn test_namespace_class_and_methods() {
        let source = r#"<?php
namespace App\Service;

use App\Repo\UserRepo;
use Psr\Log\LoggerInterface as Log;

final class UserService extends Base implements Countable, JsonSerializable
{
    public const VERSION = '2';
    private ?string $name = null;

    public function __construct(private UserRepo $repo) {}

    protected static function find(int $id): ?User
    {
        return $this->repo->find($id) ?? self::fallback($id);
    }

    function count(): int { return 0; }

    abstract protected function hook();
}

function helper() {}
"#;
        let decls = scan_php(source);

        let ns = decls.iter().position(|d| d.kind == DeclarationKind::Namespace).unwrap();
        assert_eq!(decls[ns].name, "App\\Service");

        let import = find(&decls, DeclarationKind::Import, "App\\Repo\\UserRepo");
        assert_eq!(import.parent, Some(ns));
        find(&decls, DeclarationKind::Import, "Psr\\Log\\LoggerInterface as Log");

        let class_idx = decls
            .iter()
            .position(|d| d.kind == DeclarationKind::Class && d.name == "UserService")
            .unwrap();
        let class = &decls[class_idx];
        assert_eq!(class.start_line, 7);
        assert_eq!(class.parent, Some(ns));
        assert!(class.has_modifier(Modifier::Final));
        assert_eq!(
            class.signature.as_deref(),
            Some(" extends Base implements Countable, JsonSerializable")
        );

        let version = find(&decls, DeclarationKind::Constant, "VERSION");
        assert_eq!(version.parent, Some(class_idx));

        let find_method = find(&decls, DeclarationKind::Method, "find");
        assert_eq!(find_method.signature.as_deref(), Some("(int $id) : ?User"));
        assert!(find_method.has_modifier(Modifier::Protected));
        assert!(find_method.has_modifier(Modifier::Static));
        assert_eq!(find_method.parent, Some(class_idx));

        let count = find(&decls, DeclarationKind::Method, "count");
        assert!(count.has_modifier(Modifier::Public));

        let hook = find(&decls, DeclarationKind::Method, "hook");
        assert!(hook.has_modifier(Modifier::Abstract));

        let helper = find(&decls, DeclarationKind::Function, "helper");
        assert_eq!(helper.parent, Some(ns));

        let hint = find(&decls, DeclarationKind::CallHint, "fallback");
        assert_eq!(hint.signature.as_deref(), Some("::"));
        assert_eq!(hint.parent, Some(class_idx));
    }

    #[test]
    fn test_trait_use_inside_class_is_not_import() {
        let source = "<?php\nclass A {\n    use Some\\Traits\\Loggable;\n}\n";
        let decls = scan_php(source);
        assert!(decls.iter().all(|d| d.kind != DeclarationKind::Import));
    }

    #[test]
    fn test_define_and_strings_are_masked() {
        let source = "<?php\ndefine('APP_ENV', 'prod');\n$s = \"function fake() {\";\n// define('NOPE', 1);\nfunction real() {}\n";
        let decls = scan_php(source);

        let env = find(&decls, DeclarationKind::Constant, "APP_ENV");
        assert_eq!(env.detail.as_deref(), Some("define"));
        assert!(decls.iter().all(|d| d.name != "NOPE" && d.name != "fake"));

        let real = find(&decls, DeclarationKind::Function, "real");
        assert_eq!(real.start_line, 5);
        assert_eq!(real.parent, None);
    }

    #[test]
    fn test_multiline_parameters() {
        let source = "<?php\nfunction build(\n    array $opts,\n    int $n\n): Result {\n    return new Result();\n}\n";
        let decls = scan_php(source);
        let build = find(&decls, DeclarationKind::Function, "build");
        assert_eq!(build.signature.as_deref(), Some("(…)"));
    }

    #[test]
    fn test_nested_function_is_local() {
        let source = "<?php\nfunction outer() {\n    function inner() {}\n}\n";
        let decls = scan_php(source);
        find(&decls, DeclarationKind::Function, "outer");
        find(&decls, DeclarationKind::LocalFunction, "inner");
    }

    #[test]
    fn test_call_hint_budget() {
        let mut body = String::from("<?php\nfunction f() {\n");
        for i in 0..20 {
            body.push_str(&format!("    $this->m{i}();\n    $this->m{i}();\n"));
        }
        body.push_str("}\n");
        let decls = scan_php(&body);
        let hints = decls.iter().filter(|d| d.kind == DeclarationKind::CallHint).count();
        assert_eq!(hints, CALL_HINTS_PER_SCOPE);
    }

    #[test]
    fn test_one_line_class_body() {
        let source = "<?php\nclass A { function b() {} }\nfunction c() {}\n";
        let decls = scan_php(source);

        let a = find(&decls, DeclarationKind::Class, "A");
        assert_eq!(a.start_line, 2);
        let b = find(&decls, DeclarationKind::Method, "b");
        assert_eq!(b.start_line, 2);
        assert!(b.has_modifier(Modifier::Public));
        // Same-line members keep their kind but cannot point back at the class
        assert_eq!(b.parent, None);

        let c = find(&decls, DeclarationKind::Function, "c");
        assert_eq!(c.start_line, 3);
    }

    #[test]
    fn test_allman_brace_with_inline_body() {
        let source = "<?php\nclass A\n{ private function b() {} }\nnamespace App { function c() {} }\n";
        let decls = scan_php(source);

        let a = decls.iter().position(|d| d.name == "A").unwrap();
        let b = find(&decls, DeclarationKind::Method, "b");
        assert_eq!((b.start_line, b.parent), (3, Some(a)));
        assert!(b.has_modifier(Modifier::Private));

        let c = find(&decls, DeclarationKind::Function, "c");
        assert_eq!(c.start_line, 4);
    }

    #[test]
    fn test_one_line_class_call_hints_once() {
        let source = "<?php\nclass A { function b() { return $this->repo->find(1); } }\n";
        let decls = scan_php(source);

        let hints: Vec<&str> = decls
            .iter()
            .filter(|d| d.kind == DeclarationKind::CallHint)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(hints, ["find"]);
        assert!(decls.iter().any(|d| d.kind == DeclarationKind::Method && d.name == "b"));
    }

    #[test]
    fn test_body_split() {
        assert_eq!(body_split("class A { function b() {} }", 7), Some(9));
        assert_eq!(body_split("class A {", 7), None);
        assert_eq!(body_split("class A {   ", 7), None);
        assert_eq!(body_split("class A", 7), None);
    }

    #[test]
    fn test_unbalanced_input_does_not_panic() {
        let decls = scan_php("<?php\n}}}\nclass A {\n  function b() {\n");
        find(&decls, DeclarationKind::Method, "b");
    }
}
