//! Kotlin-lite Scanner
//!
//! Compose-aware line scanner. Besides packages, imports, class-likes and
//! functions it reports `remember` state, effect blocks and conditional UI
//! guards, which carry most of the structure of a Compose screen.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::common::{
    BlockTracker, MaskOptions, Scope, cap_annotations, classify_callable, collapse_whitespace,
    collect_annotations, enclosing_class, enclosing_container, indent_width, inline_annotations,
    mask_source, paren_args,
};
use crate::constants::scanner::{LOCAL_FUN_INDENT, MAX_GUARD_LEN};
use crate::types::{Declaration, DeclarationKind, LiteLanguage, Modifier, Outline};

mod patterns {
    use super::*;

    pub static PACKAGE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*package\s+([\w.]+)").expect("package regex"));
    pub static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*import\s+([\w.*`]+(?:\s+as\s+\w+)?)").expect("import regex")
    });
    pub static COMPANION: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*((?:(?:private|public|internal|protected)\s+)*)companion\s+object(?:\s+([A-Za-z_]\w*))?")
            .expect("companion regex")
    });
    pub static CLASS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^\s*((?:@[\w.]+(?:\([^)]*\))?\s+)*)((?:(?:public|private|protected|internal|data|sealed|open|abstract|inner|value|annotation|enum|final|expect|actual)\s+)*)(class|interface|object|fun\s+interface)\s+([A-Za-z_]\w*)",
        )
        .expect("class regex")
    });
    pub static CONST_VAL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*((?:(?:private|public|internal|protected)\s+)*)const\s+val\s+([A-Za-z_]\w*)")
            .expect("const val regex")
    });
    pub static FUN: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^\s*((?:@[\w.]+(?:\([^)]*\))?\s+)*)((?:(?:public|private|protected|internal|final|open|abstract|override|suspend|inline|tailrec|operator|infix|external|expect|actual)\s+)*)fun\s+(?:<[^>]*>\s*)?(?:([A-Za-z_][\w.<>?, *]*?)\.)?([A-Za-z_]\w*|`[^`]+`)\s*\(",
        )
        .expect("fun regex")
    });
    pub static RETURN_TYPE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*:\s*([^={]+)").expect("return type regex"));
    pub static STATE_BY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(?:var|val)\s+([A-Za-z_]\w*)(?:\s*:\s*[^=]+?)?\s+by\s+(remember\w*)")
            .expect("state delegate regex")
    });
    pub static STATE_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(?:var|val)\s+([A-Za-z_]\w*)(?:\s*:\s*[^=]+?)?\s*=\s*(remember\w*)\s*[({<]")
            .expect("state assign regex")
    });
    pub static EFFECT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(LaunchedEffect|DisposableEffect|SideEffect|rememberCoroutineScope|produceState)\s*([({])")
            .expect("effect regex")
    });
    pub static GUARD_IF: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*(?:\}\s*else\s+)?if\s*\(\s*!?\s*((?:show|overlay)\w+|reset\w*(?:Index|One|All)\b)")
            .expect("guard regex")
    });
    pub static GUARD_LET: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*([A-Za-z_]\w*)\?\.let\s*\{").expect("let guard regex")
    });
}

fn keyword_modifiers(keywords: &str) -> impl Iterator<Item = Modifier> + '_ {
    keywords.split_whitespace().filter_map(Modifier::from_keyword)
}

/// Supertype list after the first top-level `:` in a class header tail
fn supertypes(raw_tail: &str, masked_tail: &str) -> Option<String> {
    let mut depth = 0i32;
    for (pos, ch) in masked_tail.char_indices() {
        match ch {
            '(' | '<' => depth += 1,
            ')' | '>' => depth -= 1,
            '{' if depth <= 0 => return None,
            ':' if depth <= 0 => {
                let rest = raw_tail.get(pos + 1..)?;
                let masked_rest = masked_tail.get(pos + 1..)?;
                let end = masked_rest.find('{').unwrap_or(masked_rest.len());
                let text = collapse_whitespace(rest.get(..end)?);
                return (!text.is_empty()).then_some(text);
            }
            _ => {}
        }
    }
    None
}

/// Scan Kotlin source. Total: never panics, never fails.
pub fn scan_kotlin(source: &str) -> Vec<Declaration> {
    let masked = mask_source(source, MaskOptions::for_language(LiteLanguage::Kotlin));
    let raw_lines: Vec<&str> = source.lines().collect();
    let mut outline = Outline::new();
    let mut tracker: BlockTracker<Scope> = BlockTracker::new();
    let mut guards_seen: HashSet<String> = HashSet::new();

    for (idx, (raw, line)) in raw_lines.iter().copied().zip(masked.lines()).enumerate() {
        let line_no = idx as u32 + 1;
        let mut declared = true;

        if let Some(caps) = patterns::PACKAGE.captures(line) {
            outline.push(Declaration::new(DeclarationKind::Namespace, &caps[1], line_no));
        } else if let Some(caps) = patterns::IMPORT.captures(line) {
            outline.push(Declaration::new(
                DeclarationKind::Import,
                collapse_whitespace(&caps[1]),
                line_no,
            ));
        } else if let Some(caps) = patterns::COMPANION.captures(line) {
            let name = caps.get(2).map_or("Companion", |m| m.as_str());
            let companion = outline.push(
                Declaration::new(DeclarationKind::Class, name, line_no)
                    .with_detail("companion object")
                    .with_modifiers(keyword_modifiers(&caps[1]))
                    .with_parent(enclosing_class(&tracker)),
            );
            tracker.expect_block(Scope::Class(companion));
        } else if let Some(caps) = patterns::CLASS.captures(line) {
            let modifiers = &caps[2];
            let keyword = collapse_whitespace(&caps[3]);
            let detail = if modifiers.split_whitespace().any(|m| m == "enum") {
                "enum class".to_string()
            } else if modifiers.split_whitespace().any(|m| m == "annotation") {
                "annotation class".to_string()
            } else {
                keyword
            };

            let name_end = caps.get(4).map_or(line.len(), |m| m.end());
            let mut decl = Declaration::new(DeclarationKind::Class, &caps[4], line_no)
                .with_detail(detail)
                .with_modifiers(keyword_modifiers(modifiers))
                .with_annotations(inline_annotations(&caps[1]))
                .with_parent(enclosing_container(&tracker));
            if let Some(supers) = supertypes(raw.get(name_end..).unwrap_or_default(), &line[name_end..]) {
                decl = decl.with_signature(format!(" : {supers}"));
            }
            let class = outline.push(decl);
            tracker.expect_block(Scope::Class(class));
        } else if let Some(caps) = patterns::FUN.captures(line) {
            let open = caps.get(0).map_or(0, |m| m.end() - 1);
            let (args, after) = paren_args(raw, line, open);
            let mut signature = format!("({args})");
            if let Some(ret) = after
                .and_then(|pos| raw.get(pos..).zip(line.get(pos..)))
                .and_then(|(raw_rest, rest)| {
                    patterns::RETURN_TYPE
                        .captures(rest)
                        .and_then(|c| c.get(1))
                        .and_then(|m| raw_rest.get(m.range()))
                })
            {
                let ret = collapse_whitespace(ret);
                if !ret.is_empty() {
                    signature.push_str(&format!(": {ret}"));
                }
            }

            let mut annotations = collect_annotations(&raw_lines, idx);
            annotations.extend(inline_annotations(&caps[1]));
            let annotations = cap_annotations(annotations);
            let composable = annotations.iter().any(|a| a == "@Composable");

            let (kind, parent) = if composable {
                match tracker.open_scopes().next() {
                    Some(Scope::Class(class)) => (DeclarationKind::Method, Some(*class)),
                    _ => (DeclarationKind::Function, enclosing_container(&tracker)),
                }
            } else {
                match classify_callable(&tracker) {
                    (DeclarationKind::Function, None) if indent_width(raw) >= LOCAL_FUN_INDENT => {
                        (DeclarationKind::LocalFunction, None)
                    }
                    classified => classified,
                }
            };

            let name = match caps.get(3) {
                Some(receiver) => format!("{}.{}", receiver.as_str().trim(), &caps[4]),
                None => caps[4].to_string(),
            };
            let mut decl = Declaration::new(kind, name, line_no)
                .with_signature(signature)
                .with_modifiers(keyword_modifiers(&caps[2]))
                .with_annotations(annotations)
                .with_parent(parent);
            if composable {
                decl = decl.with_modifier(Modifier::Composable);
            }
            let func = outline.push(decl);
            tracker.expect_block(Scope::Function(func));
        } else if let Some(caps) = patterns::CONST_VAL.captures(line) {
            outline.push(
                Declaration::new(DeclarationKind::Constant, &caps[2], line_no)
                    .with_modifiers(keyword_modifiers(&caps[1]))
                    .with_parent(enclosing_container(&tracker)),
            );
        } else {
            declared = false;
        }

        if !declared {
            let parent = enclosing_container(&tracker);

            let state = patterns::STATE_BY
                .captures(line)
                .or_else(|| patterns::STATE_ASSIGN.captures(line))
                .filter(|c| &c[2] != "rememberCoroutineScope");
            if let Some(caps) = state {
                outline.push(
                    Declaration::new(DeclarationKind::StateVariable, &caps[1], line_no)
                        .with_detail(&caps[2])
                        .with_parent(parent),
                );
            }

            for caps in patterns::EFFECT.captures_iter(line) {
                let mut decl = Declaration::new(DeclarationKind::EffectBlock, &caps[1], line_no)
                    .with_parent(parent);
                if let Some(open) = caps.get(2).filter(|m| m.as_str() == "(") {
                    let (args, _) = paren_args(raw, line, open.start());
                    decl = decl.with_signature(format!("({args})"));
                }
                outline.push(decl);
            }

            if let Some(caps) = patterns::GUARD_IF.captures(line) {
                let cond = caps[1].to_string();
                if guards_seen.insert(cond.clone()) {
                    let shown: String = cond.chars().take(MAX_GUARD_LEN).collect();
                    outline.push(
                        Declaration::new(DeclarationKind::UiGuard, format!("if ({shown})"), line_no)
                            .with_parent(parent),
                    );
                }
            } else if let Some(caps) = patterns::GUARD_LET.captures(line) {
                let cond = caps[1].to_string();
                if guards_seen.insert(cond.clone()) {
                    outline.push(
                        Declaration::new(DeclarationKind::UiGuard, format!("{cond}?.let {{ }}"), line_no)
                            .with_parent(parent),
                    );
                }
            }
        }

        tracker.feed_line(line);
    }

    outline.into_vec()
}
