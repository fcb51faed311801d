//! Java-lite Scanner

use std::sync::LazyLock;

use regex::Regex;

use super::common::{
    BlockTracker, MaskOptions, Scope, cap_annotations, classify_callable, collapse_whitespace,
    collect_annotations, enclosing_container, inline_annotations, mask_source, paren_args,
};
use crate::types::{Declaration, DeclarationKind, LiteLanguage, Modifier, Outline};

mod patterns {
    use super::*;

    pub static PACKAGE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*package\s+([\w.]+)\s*;").expect("package regex"));
    pub static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*import\s+(static\s+)?([\w.*]+)\s*;").expect("import regex")
    });
    pub static TYPE_DECL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^\s*((?:@[\w.]+(?:\([^)]*\))?\s+)*)((?:(?:public|protected|private|static|abstract|final|sealed|non-sealed|strictfp)\s+)*)(class|interface|enum|record|@interface)\s+([A-Za-z_]\w*)",
        )
        .expect("type regex")
    });
    pub static EXTENDS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\bextends\s+([^{]+?)(?:\s+implements\b|\s+permits\b|\s*\{|\s*$)")
            .expect("extends regex")
    });
    pub static IMPLEMENTS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\bimplements\s+([^{]+?)(?:\s+permits\b|\s*\{|\s*$)")
            .expect("implements regex")
    });
    pub static CONSTANT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^\s*((?:(?:public|protected|private|static|final|transient|volatile)\s+)+)([\w.<>\[\], ?]+?)\s+([A-Z][A-Z0-9_]*)\s*[=;]",
        )
        .expect("constant regex")
    });
    pub static METHOD: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^\s*((?:@[\w.]+(?:\([^)]*\))?\s+)*)((?:(?:public|protected|private|static|abstract|final|synchronized|native|default|strictfp)\s+)*)(?:<[^>]*>\s+)?(?:([\w.<>\[\], ?]+?)\s+)?([A-Za-z_]\w*)\s*\(",
        )
        .expect("method regex")
    });
}

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "return", "throw", "new", "else", "case", "catch", "try",
    "do",
];

fn keyword_modifiers(keywords: &str) -> impl Iterator<Item = Modifier> + '_ {
    keywords.split_whitespace().filter_map(Modifier::from_keyword)
}

fn starts_with_control(line: &str) -> bool {
    let trimmed = line.trim_start();
    let first = trimmed
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .next()
        .unwrap_or_default();
    if first == "synchronized" {
        // `synchronized (lock) {` is a statement; `synchronized void f()` is a method
        return trimmed[first.len()..].trim_start().starts_with('(');
    }
    CONTROL_KEYWORDS.contains(&first)
}

/// Skip a leading `<...>` type parameter list
fn skip_type_params(tail: &str) -> &str {
    let trimmed = tail.trim_start();
    if !trimmed.starts_with('<') {
        return tail;
    }
    let mut depth = 0i32;
    for (pos, ch) in trimmed.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return &trimmed[pos + 1..];
                }
            }
            _ => {}
        }
    }
    ""
}

fn heritage(tail: &str) -> String {
    let mut out = String::new();
    if let Some(caps) = patterns::EXTENDS.captures(tail) {
        out.push_str(&format!(" extends {}", collapse_whitespace(&caps[1])));
    }
    if let Some(caps) = patterns::IMPLEMENTS.captures(tail) {
        out.push_str(&format!(" implements {}", collapse_whitespace(&caps[1])));
    }
    out
}

/// Scan Java source. Total: never panics, never fails.
pub fn scan_java(source: &str) -> Vec<Declaration> {
    let masked = mask_source(source, MaskOptions::for_language(LiteLanguage::Java));
    let raw_lines: Vec<&str> = source.lines().collect();
    let mut outline = Outline::new();
    let mut tracker: BlockTracker<Scope> = BlockTracker::new();

    for (idx, (raw, line)) in raw_lines.iter().copied().zip(masked.lines()).enumerate() {
        let line_no = idx as u32 + 1;

        if let Some(caps) = patterns::PACKAGE.captures(line) {
            outline.push(Declaration::new(DeclarationKind::Namespace, &caps[1], line_no));
        } else if let Some(caps) = patterns::IMPORT.captures(line) {
            let mut decl = Declaration::new(DeclarationKind::Import, &caps[2], line_no);
            if caps.get(1).is_some() {
                decl = decl.with_modifier(Modifier::Static);
            }
            outline.push(decl);
        } else if let Some(caps) = patterns::TYPE_DECL.captures(line) {
            let name_end = caps.get(4).map_or(line.len(), |m| m.end());
            let raw_tail = raw.get(name_end..).unwrap_or_default();
            let tail = skip_type_params(raw_tail);

            let mut signature = String::new();
            if &caps[3] == "record"
                && let Some(open) = tail.find('(')
            {
                let offset = raw_tail.len() - tail.len() + name_end + open;
                let (components, _) = paren_args(raw, line, offset);
                signature.push_str(&format!("({components})"));
            }
            signature.push_str(&heritage(tail));

            let mut annotations = collect_annotations(&raw_lines, idx);
            annotations.extend(inline_annotations(&caps[1]));

            let mut decl = Declaration::new(DeclarationKind::Class, &caps[4], line_no)
                .with_detail(&caps[3])
                .with_modifiers(keyword_modifiers(&caps[2]))
                .with_annotations(cap_annotations(annotations))
                .with_parent(enclosing_container(&tracker));
            if !signature.is_empty() {
                decl = decl.with_signature(signature);
            }
            let class = outline.push(decl);
            tracker.expect_block(Scope::Class(class));
        } else if starts_with_control(line) {
            // statements, not declarations
        } else if let Some(caps) = patterns::CONSTANT.captures(line)
            && caps[1].split_whitespace().any(|m| m == "static")
            && caps[1].split_whitespace().any(|m| m == "final")
        {
            outline.push(
                Declaration::new(DeclarationKind::Constant, &caps[3], line_no)
                    .with_signature(format!(": {}", collapse_whitespace(&caps[2])))
                    .with_modifiers(keyword_modifiers(&caps[1]))
                    .with_parent(enclosing_container(&tracker)),
            );
        } else if let Some(caps) = patterns::METHOD.captures(line) {
            let name = &caps[4];
            let enclosing_class = tracker.open_scopes().find_map(|s| match s {
                Scope::Class(i) => outline.get(*i),
                _ => None,
            });
            let is_constructor = caps.get(3).is_none()
                && enclosing_class.is_some_and(|class| class.name == name);

            // A bare `name(` without a return type is a call unless it names the class
            if caps.get(3).is_some() || is_constructor {
                let open = caps.get(0).map_or(0, |m| m.end() - 1);
                let (args, _) = paren_args(raw, line, open);
                let mut signature = format!("({args})");
                if let Some(ret) = caps.get(3) {
                    signature.push_str(&format!(" : {}", collapse_whitespace(ret.as_str())));
                }

                let mut annotations = collect_annotations(&raw_lines, idx);
                annotations.extend(inline_annotations(&caps[1]));

                let (kind, parent) = classify_callable(&tracker);
                let mut decl = Declaration::new(kind, name, line_no)
                    .with_signature(signature)
                    .with_modifiers(keyword_modifiers(&caps[2]))
                    .with_annotations(cap_annotations(annotations))
                    .with_parent(parent);
                if is_constructor {
                    decl = decl.with_detail("constructor");
                }
                let method = outline.push(decl);
                tracker.expect_block(Scope::Function(method));
            }
        }

        tracker.feed_line(line);
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

    const SERVICE: &str = r#"package com.example.service;

import java.util.List;
import static java.util.Objects.requireNonNull;

@Service
public class UserService extends BaseService implements Closeable, Runnable {
    public static final int MAX_USERS = 100;
    private static final String PREFIX = "user:";
    private final Repo repo;

    @Inject
    public UserService(Repo repo) {
        this.repo = requireNonNull(repo);
    }

    @Override
    public <T> List<T> findAll(Class<T> type, int limit) throws IOException {
        if (limit > MAX_USERS) {
            throw new IllegalArgumentException("limit");
        }
        audit(type);
        return repo.load(type);
    }

    static class Cache {
        void clear() {}
    }

    public interface Listener {
        void onUser(String id);
    }

    public record Entry(String id, int score) implements Comparable<Entry> {
    }
}

enum Color { RED, GREEN }
"#;

    #[test]
    fn test_service_outline() {
        let decls = scan_java(SERVICE);

        find(&decls, DeclarationKind::Namespace, "com.example.service");
        let list = find(&decls, DeclarationKind::Import, "java.util.List");
        assert!(!list.has_modifier(Modifier::Static));
        let require = find(&decls, DeclarationKind::Import, "java.util.Objects.requireNonNull");
        assert!(require.has_modifier(Modifier::Static));

        let service_idx = decls.iter().position(|d| d.name == "UserService").unwrap();
        let service = &decls[service_idx];
        assert_eq!(service.start_line, 7);
        assert_eq!(service.annotations, vec!["@Service"]);
        assert!(service.has_modifier(Modifier::Public));
        assert_eq!(
            service.signature.as_deref(),
            Some(" extends BaseService implements Closeable, Runnable")
        );

        let max = find(&decls, DeclarationKind::Constant, "MAX_USERS");
        assert_eq!(max.signature.as_deref(), Some(": int"));
        assert_eq!(max.parent, Some(service_idx));
        assert!(max.has_modifier(Modifier::Static) && max.has_modifier(Modifier::Final));
        find(&decls, DeclarationKind::Constant, "PREFIX");
        assert!(decls.iter().all(|d| d.name != "repo"));

        let ctor = find(&decls, DeclarationKind::Method, "UserService");
        assert_eq!(ctor.detail.as_deref(), Some("constructor"));
        assert_eq!(ctor.signature.as_deref(), Some("(Repo repo)"));
        assert_eq!(ctor.annotations, vec!["@Inject"]);
        assert_eq!(ctor.parent, Some(service_idx));

        let find_all = find(&decls, DeclarationKind::Method, "findAll");
        assert_eq!(
            find_all.signature.as_deref(),
            Some("(Class<T> type, int limit) : List<T>")
        );
        assert_eq!(find_all.annotations, vec!["@Override"]);

        // Statements are not declarations
        for name in ["audit", "requireNonNull", "IllegalArgumentException", "load"] {
            assert!(decls.iter().all(|d| d.name != name || d.kind == DeclarationKind::Import));
        }

        let cache_idx = decls.iter().position(|d| d.name == "Cache").unwrap();
        assert_eq!(decls[cache_idx].parent, Some(service_idx));
        assert!(decls[cache_idx].has_modifier(Modifier::Static));
        assert_eq!(find(&decls, DeclarationKind::Method, "clear").parent, Some(cache_idx));

        let listener = find(&decls, DeclarationKind::Class, "Listener");
        assert_eq!(listener.detail.as_deref(), Some("interface"));
        find(&decls, DeclarationKind::Method, "onUser");

        let entry = find(&decls, DeclarationKind::Class, "Entry");
        assert_eq!(
            entry.signature.as_deref(),
            Some("(String id, int score) implements Comparable<Entry>")
        );

        let color = find(&decls, DeclarationKind::Class, "Color");
        assert_eq!(color.detail.as_deref(), Some("enum"));
        assert_eq!(color.parent, None);
    }

    #[test]
    fn test_generic_class_bounds_are_not_heritage() {
        let decls = scan_java("class Box<T extends Comparable<T>> extends Base {\n}\n");
        assert_eq!(decls[0].signature.as_deref(), Some(" extends Base"));
    }

    #[test]
    fn test_annotation_type_and_comments() {
        let source = "// class Ghost {}\npublic @interface Marker {}\n/* void hidden() */\n";
        let decls = scan_java(source);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "Marker");
        assert_eq!(decls[0].detail.as_deref(), Some("@interface"));
        assert_eq!(decls[0].start_line, 2);
    }

    #[test]
    fn test_synchronized_methods_and_blocks() {
        let source = "class Counter {\n    synchronized void increment() {\n        synchronized (this) {\n            count++;\n        }\n    }\n    public synchronized int get() {\n        return count;\n    }\n}\n";
        let decls = scan_java(source);

        let names: Vec<_> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Counter", "increment", "get"]);

        let increment = find(&decls, DeclarationKind::Method, "increment");
        assert_eq!(increment.start_line, 2);
        assert_eq!(increment.signature.as_deref(), Some("() : void"));
        assert_eq!(increment.parent, Some(0));
        assert!(find(&decls, DeclarationKind::Method, "get").has_modifier(Modifier::Public));
    }
}
