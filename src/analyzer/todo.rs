//! TODO Marker Finder
//!
//! Line-oriented scan for TODO/FIXME/HACK/TEMP markers in comment-like lines.
//! Language-independent, so it runs the same way for every extractor.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::warnings::MAX_TEXT_LEN;
use crate::types::{Declaration, DeclarationKind};

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(TODO|FIXME|HACK|TEMP)\b").expect("todo marker regex"));

/// Collect up to `limit` markers in source order.
pub fn find_todos(source: &str, limit: usize) -> Vec<Declaration> {
    let mut markers = Vec::new();
    if limit == 0 {
        return markers;
    }

    for (idx, line) in source.lines().enumerate() {
        let Some(tag) = MARKER.captures(line).and_then(|c| c.get(1)) else {
            continue;
        };
        if !is_comment_like(line) {
            continue;
        }

        let text = truncate_chars(line.trim(), MAX_TEXT_LEN);
        markers.push(
            Declaration::new(
                DeclarationKind::TodoMarker,
                tag.as_str().to_uppercase(),
                idx as u32 + 1,
            )
            .with_detail(text),
        );

        if markers.len() >= limit {
            break;
        }
    }

    markers
}

fn is_comment_like(line: &str) -> bool {
    let stripped = line.trim_start();
    stripped.starts_with('#')
        || stripped.starts_with("//")
        || stripped.starts_with('*')
        || line.contains(" #")
        || line.contains(" //")
        || line.contains("/*")
        || line.contains("*/")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_comment_markers() {
        let source = "x = 1  # TODO: tidy\n// FIXME later\nname = 'TODO'\n/* hack */\n";
        let markers = find_todos(source, 12);

        let found: Vec<_> = markers
            .iter()
            .map(|m| (m.start_line, m.name.as_str()))
            .collect();
        assert_eq!(found, vec![(1, "TODO"), (2, "FIXME"), (4, "HACK")]);
        assert_eq!(markers[0].detail.as_deref(), Some("x = 1  # TODO: tidy"));
    }

    #[test]
    fn test_whole_word_only() {
        let source = "# render the template\n# TEMP workaround\n";
        let markers = find_todos(source, 12);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].start_line, 2);
        assert_eq!(markers[0].name, "TEMP");
    }

    #[test]
    fn test_limit() {
        let source = "# TODO a\n# TODO b\n# TODO c\n";
        assert_eq!(find_todos(source, 2).len(), 2);
        assert!(find_todos(source, 0).is_empty());
    }

    #[test]
    fn test_truncates_long_lines() {
        let source = format!("# TODO {}", "é".repeat(300));
        let markers = find_todos(&source, 12);
        let detail = markers[0].detail.as_deref().unwrap();
        assert!(detail.ends_with("..."));
        assert_eq!(detail.chars().count(), MAX_TEXT_LEN + 3);
    }

    #[test]
    fn test_javadoc_continuation_line() {
        let source = "/**\n * TODO document the contract\n */";
        let markers = find_todos(source, 12);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].start_line, 2);
    }
}
