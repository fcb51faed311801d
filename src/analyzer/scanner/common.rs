//! Shared Lexical Machinery
//!
//! - [`mask_source`]: blanks string and comment contents while keeping every
//!   byte offset and newline, so patterns run on masked text and names are cut
//!   from the raw text at the same offsets.
//! - [`BlockTracker`]: brace depth plus a stack of open class/function scopes.
//! - Small helpers shared by the PHP, Kotlin and Java scanners.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::scanner::{ANNOTATION_LOOKBACK, MAX_ANNOTATIONS};
use crate::types::{DeclarationKind, LiteLanguage};

// =============================================================================
// Masking Lexer
// =============================================================================

/// Language-specific lexical options for [`mask_source`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskOptions {
    /// `#` starts a line comment (but `#[` does not)
    pub hash_comments: bool,
    /// Backtick-delimited strings
    pub backtick_strings: bool,
    /// `"""` raw/text blocks
    pub triple_quotes: bool,
    /// Ordinary strings may run across lines
    pub multiline_strings: bool,
    /// Blank `<?php`, `<?=` and `?>`
    pub php_tags: bool,
}

impl MaskOptions {
    pub fn for_language(language: LiteLanguage) -> Self {
        match language {
            LiteLanguage::Php => Self {
                hash_comments: true,
                backtick_strings: true,
                triple_quotes: false,
                multiline_strings: true,
                php_tags: true,
            },
            LiteLanguage::Kotlin | LiteLanguage::Java => Self {
                triple_quotes: true,
                ..Self::default()
            },
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    LineComment,
    BlockComment,
    Str(u8),
    TripleStr,
}

/// Replace comment and string contents with spaces.
///
/// Quote characters stay in place; newlines and carriage returns are kept.
/// The output has the same byte length as the input.
pub fn mask_source(source: &str, options: MaskOptions) -> String {
    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut state = LexState::Code;
    let mut i = 0;

    let blank = |out: &mut Vec<u8>, b: u8| {
        out.push(if b == b'\n' || b == b'\r' { b } else { b' ' });
    };

    while i < bytes.len() {
        let b = bytes[i];
        let rest = &bytes[i..];
        match state {
            LexState::Code => {
                if options.php_tags && rest.starts_with(b"<?php") {
                    out.extend_from_slice(b"     ");
                    i += 5;
                    continue;
                }
                if options.php_tags && rest.starts_with(b"<?=") {
                    out.extend_from_slice(b"   ");
                    i += 3;
                    continue;
                }
                if options.php_tags && (rest.starts_with(b"?>") || rest.starts_with(b"<?")) {
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                if rest.starts_with(b"//") {
                    state = LexState::LineComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                if rest.starts_with(b"/*") {
                    state = LexState::BlockComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                if options.hash_comments && b == b'#' && rest.get(1) != Some(&b'[') {
                    state = LexState::LineComment;
                    out.push(b' ');
                    i += 1;
                    continue;
                }
                if options.triple_quotes && rest.starts_with(b"\"\"\"") {
                    state = LexState::TripleStr;
                    out.extend_from_slice(b"\"\"\"");
                    i += 3;
                    continue;
                }
                if b == b'"' || b == b'\'' || (options.backtick_strings && b == b'`') {
                    state = LexState::Str(b);
                }
                out.push(b);
                i += 1;
            }
            LexState::LineComment => {
                if b == b'\n' {
                    state = LexState::Code;
                }
                blank(&mut out, b);
                i += 1;
            }
            LexState::BlockComment => {
                if rest.starts_with(b"*/") {
                    state = LexState::Code;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                blank(&mut out, b);
                i += 1;
            }
            LexState::Str(quote) => {
                if b == b'\\' && i + 1 < bytes.len() {
                    blank(&mut out, b);
                    blank(&mut out, bytes[i + 1]);
                    i += 2;
                    continue;
                }
                if b == quote {
                    state = LexState::Code;
                    out.push(b);
                } else {
                    if b == b'\n' && !options.multiline_strings {
                        state = LexState::Code;
                    }
                    blank(&mut out, b);
                }
                i += 1;
            }
            LexState::TripleStr => {
                if rest.starts_with(b"\"\"\"") {
                    state = LexState::Code;
                    out.extend_from_slice(b"\"\"\"");
                    i += 3;
                    continue;
                }
                blank(&mut out, b);
                i += 1;
            }
        }
    }

    // Only ASCII bytes were substituted, and only whole code points were blanked
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

// =============================================================================
// Block Tracker
// =============================================================================

#[derive(Debug, Clone)]
struct OpenScope<S> {
    scope: S,
    /// Brace depth before the opening `{`
    depth: usize,
}

#[derive(Debug, Clone)]
struct PendingScope<S> {
    scope: S,
    /// Unclosed `(` seen since the header started
    parens: i32,
    /// Header ended without `{`; only a line starting with `{` may open it
    awaiting_brace: bool,
}

/// Brace-depth tracker with a stack of named scopes.
///
/// Declarations that expect a body call [`BlockTracker::expect_block`]; the
/// next `{` opens that scope. Unbalanced `}` is clamped at depth 0 and
/// unclosed scopes simply stay open.
#[derive(Debug, Clone)]
pub struct BlockTracker<S> {
    depth: usize,
    open: Vec<OpenScope<S>>,
    pending: Option<PendingScope<S>>,
}

impl<S> Default for BlockTracker<S> {
    fn default() -> Self {
        Self {
            depth: 0,
            open: Vec::new(),
            pending: None,
        }
    }
}

impl<S: Clone> BlockTracker<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope whose `{` has not been seen yet
    pub fn expect_block(&mut self, scope: S) {
        self.pending = Some(PendingScope {
            scope,
            parens: 0,
            awaiting_brace: false,
        });
    }

    /// Consume one masked line.
    pub fn feed_line(&mut self, masked: &str) {
        if let Some(pending) = &self.pending
            && pending.awaiting_brace
            && !masked.trim_start().starts_with('{')
        {
            self.pending = None;
        }

        for ch in masked.chars() {
            match ch {
                '{' => {
                    if let Some(pending) = self.pending.take() {
                        self.open.push(OpenScope {
                            scope: pending.scope,
                            depth: self.depth,
                        });
                    }
                    self.depth += 1;
                }
                '}' => {
                    self.depth = self.depth.saturating_sub(1);
                    while self.open.last().is_some_and(|s| s.depth >= self.depth) {
                        self.open.pop();
                    }
                }
                '(' => {
                    if let Some(pending) = &mut self.pending {
                        pending.parens += 1;
                    }
                }
                ')' => {
                    if let Some(pending) = &mut self.pending {
                        pending.parens -= 1;
                    }
                }
                ';' => {
                    if self.pending.as_ref().is_some_and(|p| p.parens <= 0) {
                        self.pending = None;
                    }
                }
                _ => {}
            }
        }

        if let Some(pending) = &mut self.pending {
            let last = masked.trim_end().chars().last();
            let header_continues =
                pending.parens > 0 || matches!(last, Some(',' | '(' | ':' | '<'));
            if !header_continues {
                pending.awaiting_brace = true;
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Scopes from innermost outwards, including a pending one
    pub fn scopes(&self) -> impl Iterator<Item = &S> {
        self.pending
            .iter()
            .map(|p| &p.scope)
            .chain(self.open.iter().rev().map(|s| &s.scope))
    }

    /// Open scopes from innermost outwards, ignoring a pending one
    pub fn open_scopes(&self) -> impl Iterator<Item = &S> {
        self.open.iter().rev().map(|s| &s.scope)
    }
}

// =============================================================================
// Scope Classification
// =============================================================================

/// Scope entries shared by all lite scanners; payload is the outline index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Namespace(usize),
    Class(usize),
    Function(usize),
}

impl Scope {
    pub fn index(&self) -> usize {
        match self {
            Scope::Namespace(i) | Scope::Class(i) | Scope::Function(i) => *i,
        }
    }

    pub fn container(&self) -> Option<usize> {
        match self {
            Scope::Namespace(i) | Scope::Class(i) => Some(*i),
            Scope::Function(_) => None,
        }
    }
}

/// Nearest enclosing class or namespace among open scopes
pub fn enclosing_container(tracker: &BlockTracker<Scope>) -> Option<usize> {
    tracker.open_scopes().find_map(Scope::container)
}

/// Nearest enclosing class among open scopes
pub fn enclosing_class(tracker: &BlockTracker<Scope>) -> Option<usize> {
    tracker.open_scopes().find_map(|s| match s {
        Scope::Class(i) => Some(*i),
        _ => None,
    })
}

/// Kind and parent for a callable declared at the tracker's current position.
///
/// Inside an open function it is local; directly in a class body it is a
/// method; otherwise a function.
pub fn classify_callable(tracker: &BlockTracker<Scope>) -> (DeclarationKind, Option<usize>) {
    match tracker.open_scopes().next() {
        Some(Scope::Function(_)) => (DeclarationKind::LocalFunction, enclosing_container(tracker)),
        Some(Scope::Class(i)) => (DeclarationKind::Method, Some(*i)),
        Some(Scope::Namespace(i)) => (DeclarationKind::Function, Some(*i)),
        None => (DeclarationKind::Function, None),
    }
}

// =============================================================================
// Text Helpers
// =============================================================================

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z_][\w.]*)").expect("annotation regex"));

/// Byte offset of the `)` matching the `(` at `open`, on a masked line
pub fn matching_paren(masked: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (offset, ch) in masked.get(open..)?.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Argument text following the `(` at `open`.
///
/// Returns the collapsed raw text between the parens and the byte offset just
/// past `)`. An unclosed list is cut at the line end and marked with `…`.
pub fn paren_args(raw: &str, masked: &str, open: usize) -> (String, Option<usize>) {
    match matching_paren(masked, open) {
        Some(close) => (
            collapse_whitespace(raw.get(open + 1..close).unwrap_or_default()),
            Some(close + 1),
        ),
        None => {
            let tail = collapse_whitespace(raw.get(open + 1..).unwrap_or_default());
            let tail = tail.trim_end_matches(',').trim_end().to_string();
            if tail.is_empty() {
                ("…".to_string(), None)
            } else {
                (format!("{tail} …"), None)
            }
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Annotation names on the lines above `line_idx` (0-based).
///
/// Blank lines and `@file:` lines are skipped; the scan stops at the first
/// non-annotation line. Anything past the cap collapses into `@...`.
pub fn collect_annotations(lines: &[&str], line_idx: usize) -> Vec<String> {
    let end = line_idx.min(lines.len());
    let start = end.saturating_sub(ANNOTATION_LOOKBACK);
    let mut tags = Vec::new();

    for line in lines[start..end].iter().rev() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("@file:") {
            continue;
        }
        if !trimmed.starts_with('@') {
            break;
        }
        // Several annotations may share a line; keep them in source order
        let mut on_line: Vec<String> = trimmed
            .split_whitespace()
            .filter_map(|token| ANNOTATION.captures(token))
            .map(|c| format!("@{}", &c[1]))
            .collect();
        on_line.reverse();
        tags.extend(on_line);
    }

    tags.reverse();
    cap_annotations(tags)
}

/// Annotations written inline before a declaration keyword
pub fn inline_annotations(prefix: &str) -> Vec<String> {
    prefix
        .split_whitespace()
        .filter_map(|token| ANNOTATION.captures(token))
        .map(|c| format!("@{}", &c[1]))
        .collect()
}

pub fn cap_annotations(mut tags: Vec<String>) -> Vec<String> {
    if tags.len() > MAX_ANNOTATIONS {
        tags.truncate(MAX_ANNOTATIONS);
        tags.push("@...".to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn php() -> MaskOptions {
        MaskOptions::for_language(LiteLanguage::Php)
    }

    fn kotlin() -> MaskOptions {
        MaskOptions::for_language(LiteLanguage::Kotlin)
    }

    #[test]
    fn test_mask_preserves_length_and_newlines() {
        let src = "a = \"x{y}\"; // note {\n/* multi\nline */ b = 'c';\n";
        let masked = mask_source(src, kotlin());
        assert_eq!(masked.len(), src.len());
        assert_eq!(masked.lines().count(), src.lines().count());
        assert!(!masked.contains('{'));
        assert!(masked.starts_with("a = \"    \";"));
    }

    #[test]
    fn test_mask_php_hash_comments_and_attributes() {
        let src = "#[Route('/x')]\n$a = 1; # close }\n";
        let masked = mask_source(src, php());
        assert!(masked.starts_with("#[Route("));
        assert!(!masked.contains('}'));
    }

    #[test]
    fn test_mask_php_tags() {
        let masked = mask_source("<?php function f() {} ?>", php());
        assert_eq!(masked, "      function f() {}   ");
    }

    #[test]
    fn test_mask_escaped_quote() {
        let masked = mask_source(r#"s = "a\"b"; t"#, kotlin());
        assert_eq!(masked, r#"s = "    "; t"#);
    }

    #[test]
    fn test_mask_multibyte_content() {
        let src = "val s = \"한글 {\"\nfun f() {}";
        let masked = mask_source(src, kotlin());
        assert_eq!(masked.len(), src.len());
        assert!(masked.ends_with("fun f() {}"));
    }

    #[test]
    fn test_mask_triple_quotes() {
        let src = "val q = \"\"\"\n  { not code }\n\"\"\"\nfun g() {}";
        let masked = mask_source(src, kotlin());
        assert_eq!(masked.matches('{').count(), 1);
    }

    #[test]
    fn test_tracker_opens_and_closes_scopes() {
        let mut tracker: BlockTracker<Scope> = BlockTracker::new();
        tracker.expect_block(Scope::Class(0));
        tracker.feed_line("class Foo {");
        assert_eq!(tracker.open_scopes().next(), Some(&Scope::Class(0)));

        tracker.expect_block(Scope::Function(1));
        tracker.feed_line("  function bar() { if (x) { y(); } }");
        assert_eq!(tracker.open_scopes().next(), Some(&Scope::Class(0)));

        tracker.feed_line("}");
        assert_eq!(tracker.open_scopes().next(), None);
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn test_tracker_cancels_pending_on_semicolon() {
        let mut tracker: BlockTracker<Scope> = BlockTracker::new();
        tracker.expect_block(Scope::Function(0));
        tracker.feed_line("abstract function f();");
        tracker.feed_line("{");
        assert_eq!(tracker.open_scopes().next(), None);
    }

    #[test]
    fn test_tracker_multiline_header_and_allman_brace() {
        let mut tracker: BlockTracker<Scope> = BlockTracker::new();
        tracker.expect_block(Scope::Function(0));
        tracker.feed_line("fun f(");
        tracker.feed_line("    a: Int,");
        tracker.feed_line(")");
        tracker.feed_line("{");
        assert_eq!(tracker.open_scopes().next(), Some(&Scope::Function(0)));
    }

    #[test]
    fn test_tracker_drops_bodyless_header() {
        let mut tracker: BlockTracker<Scope> = BlockTracker::new();
        tracker.expect_block(Scope::Class(0));
        tracker.feed_line("data class P(val x: Int)");
        tracker.feed_line("fun main() {");
        assert_eq!(tracker.open_scopes().next(), None);
        assert_eq!(tracker.depth(), 1);
    }

    #[test]
    fn test_tracker_clamps_unbalanced_close() {
        let mut tracker: BlockTracker<Scope> = BlockTracker::new();
        tracker.feed_line("}}}");
        assert_eq!(tracker.depth(), 0);
        tracker.expect_block(Scope::Class(0));
        tracker.feed_line("class A {");
        assert_eq!(enclosing_class(&tracker), Some(0));
    }

    #[test]
    fn test_classify_callable() {
        let mut tracker: BlockTracker<Scope> = BlockTracker::new();
        assert_eq!(classify_callable(&tracker), (DeclarationKind::Function, None));

        tracker.expect_block(Scope::Class(0));
        tracker.feed_line("class A {");
        assert_eq!(classify_callable(&tracker), (DeclarationKind::Method, Some(0)));

        tracker.expect_block(Scope::Function(1));
        tracker.feed_line("fun b() {");
        assert_eq!(
            classify_callable(&tracker),
            (DeclarationKind::LocalFunction, Some(0))
        );
    }

    #[test]
    fn test_paren_args() {
        let raw = "function f($a,   $b = 'x)') : int {";
        let masked = mask_source(raw, php());
        let open = raw.find('(').unwrap();
        let (args, after) = paren_args(raw, &masked, open);
        assert_eq!(args, "$a, $b = 'x)'");
        assert_eq!(&raw[after.unwrap()..], " : int {");

        let raw = "fun g(a: Int,";
        let (args, after) = paren_args(raw, raw, 5);
        assert_eq!(args, "a: Int …");
        assert!(after.is_none());
    }

    #[test]
    fn test_collect_annotations() {
        let lines = vec![
            "@file:JvmName(\"X\")",
            "@Composable",
            "",
            "@Preview(showBackground = true) @Suppress(\"x\")",
            "fun Screen() {}",
        ];
        assert_eq!(
            collect_annotations(&lines, 4),
            vec!["@Composable", "@Preview", "@Suppress"]
        );

        let lines = vec!["val x = 1", "fun f() {}"];
        assert!(collect_annotations(&lines, 1).is_empty());
    }

    #[test]
    fn test_cap_annotations() {
        let tags: Vec<String> = (0..6).map(|i| format!("@A{i}")).collect();
        let capped = cap_annotations(tags);
        assert_eq!(capped.len(), MAX_ANNOTATIONS + 1);
        assert_eq!(capped.last().unwrap(), "@...");
    }
}
