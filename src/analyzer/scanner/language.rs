//! Lite Language Sniffing
//!
//! Picks the lexical scanner for a source that failed structural parsing.
//! Resolution order: filename extension, header hints in the first lines,
//! then weighted keyword scoring over the whole text.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::sniff::{HEAD_LINES, TIE_MARGIN};
use crate::types::LiteLanguage;

mod patterns {
    use super::*;

    macro_rules! pattern {
        ($name:ident, $re:literal) => {
            pub static $name: LazyLock<Regex> =
                LazyLock::new(|| Regex::new($re).expect(stringify!($name)));
        };
    }

    // Header hints
    pattern!(KOTLIN_PACKAGE, r"(?m)^\s*package\s+[a-zA-Z_][\w.]*\s*$");
    pattern!(JAVA_PACKAGE, r"(?m)^\s*package\s+[a-zA-Z_][\w.]*\s*;\s*$");
    pattern!(KOTLIN_KEYWORDS, r"\b(?:fun|companion\s+object|data\s+class|sealed\s+class|object\s+)\b");

    // PHP
    pattern!(PHP_VARIABLE, r"\$\w+");
    pattern!(PHP_ARROW_CALL, r"->\s*[A-Za-z_]\w*\s*\(");
    pattern!(PHP_STATIC_CALL, r"::\s*[A-Za-z_]\w*\s*\(");
    pattern!(PHP_NAMESPACE, r"(?m)^\s*namespace\s+[^;{]+\s*;");
    pattern!(PHP_USE, r"(?m)^\s*use\s+[^;]+\s*;");
    pattern!(PHP_FUNCTION, r"\bfunction\s+\w+\s*\(");

    // Kotlin
    pattern!(KOTLIN_FUN, r"(?m)^\s*fun\s+\w+\s*\(");
    pattern!(KOTLIN_MODIFIED_FUN, r"\b(?:private|public|internal|protected|suspend|inline|override)\s+fun\s+\w+\s*\(");
    pattern!(KOTLIN_OVERRIDE_FUN, r"\boverride\s+fun\s+\w+\s*\(");
    pattern!(KOTLIN_DECL, r"\b(?:companion\s+object|data\s+class|sealed\s+class|object\s+)\b");
    pattern!(KOTLIN_VAL_VAR, r"\bval\s+\w+\s*[:=]|\bvar\s+\w+\s*[:=]");
    pattern!(KOTLIN_WHEN, r"\bwhen\s*\(");
    pattern!(KOTLIN_COMPOSABLE, r"@Composable\b");
    pattern!(KOTLIN_REMEMBER, r"\bby\s+remember");

    // Java
    pattern!(JAVA_IMPORT, r"(?m)^\s*import\s+[\w.]+\s*;\s*$");
    pattern!(JAVA_TYPE_DECL, r"\b(?:public|protected|private)\s+(?:class|interface|enum|record)\s+\w+");
    pattern!(JAVA_STATIC, r"\bstatic\b");
}

/// Weighted evidence per lite language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SniffScores {
    pub php: u32,
    pub kotlin: u32,
    pub java: u32,
}

impl SniffScores {
    pub fn compute(source: &str) -> Self {
        use patterns::*;

        fn count(re: &Regex, source: &str) -> u32 {
            re.find_iter(source).count() as u32
        }
        fn flag(re: &Regex, source: &str, weight: u32) -> u32 {
            if re.is_match(source) { weight } else { 0 }
        }

        let php = 4 * count(&PHP_VARIABLE, source)
            + 3 * count(&PHP_ARROW_CALL, source)
            + 3 * count(&PHP_STATIC_CALL, source)
            + flag(&PHP_NAMESPACE, source, 8)
            + flag(&PHP_USE, source, 4)
            + flag(&PHP_FUNCTION, source, 2);

        let kotlin = flag(&KOTLIN_FUN, source, 10)
            + flag(&KOTLIN_MODIFIED_FUN, source, 10)
            + flag(&KOTLIN_OVERRIDE_FUN, source, 8)
            + flag(&KOTLIN_DECL, source, 8)
            + flag(&KOTLIN_VAL_VAR, source, 3)
            + flag(&KOTLIN_WHEN, source, 2)
            + flag(&KOTLIN_COMPOSABLE, source, 6)
            + flag(&KOTLIN_REMEMBER, source, 8);

        let java = flag(&JAVA_IMPORT, source, 4)
            + flag(&JAVA_TYPE_DECL, source, 9)
            + flag(&JAVA_STATIC, source, 2);

        Self { php, kotlin, java }
    }

    /// Languages ordered by score, highest first; ties keep PHP, Kotlin, Java order
    pub fn ranked(&self) -> [(LiteLanguage, u32); 3] {
        let mut ranked = [
            (LiteLanguage::Php, self.php),
            (LiteLanguage::Kotlin, self.kotlin),
            (LiteLanguage::Java, self.java),
        ];
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Pick the lite language for `source`.
///
/// When nothing scores, Kotlin is chosen.
pub fn sniff_language(source: &str, filename: Option<&str>) -> LiteLanguage {
    if let Some(lang) = filename.and_then(LiteLanguage::from_path) {
        tracing::debug!("Sniffed {} from filename", lang);
        return lang;
    }

    let head_end = source
        .match_indices('\n')
        .nth(HEAD_LINES - 1)
        .map_or(source.len(), |(i, _)| i);
    let head = &source[..head_end];

    if head.to_lowercase().contains("<?php") {
        return LiteLanguage::Php;
    }
    if patterns::KOTLIN_PACKAGE.is_match(head) && patterns::KOTLIN_KEYWORDS.is_match(source) {
        return LiteLanguage::Kotlin;
    }
    if patterns::JAVA_PACKAGE.is_match(head) {
        return LiteLanguage::Java;
    }

    let scores = SniffScores::compute(source);
    let [(best, top), (_, second), _] = scores.ranked();
    tracing::debug!(
        "Sniff scores: php={} kotlin={} java={}",
        scores.php,
        scores.kotlin,
        scores.java
    );

    if top == 0 {
        return LiteLanguage::Kotlin;
    }
    if top - second <= TIE_MARGIN {
        if patterns::PHP_VARIABLE.is_match(source) {
            return LiteLanguage::Php;
        }
        if patterns::KOTLIN_KEYWORDS.is_match(source) {
            return LiteLanguage::Kotlin;
        }
    }
    best
}
