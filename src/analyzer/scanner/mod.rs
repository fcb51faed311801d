//! Lexical Scanners
//!
//! Best-effort, line-oriented declaration scanners for PHP, Kotlin and Java.
//! They run on masked text (see [`common::mask_source`]) and never fail:
//! malformed or truncated input yields fewer declarations, not errors.

pub mod common;
pub mod java;
pub mod kotlin;
pub mod language;
pub mod php;

pub use java::scan_java;
pub use kotlin::scan_kotlin;
pub use language::{SniffScores, sniff_language};
pub use php::scan_php;

use crate::types::{Declaration, LiteLanguage};

/// Run the scanner for `language`
pub fn scan(source: &str, language: LiteLanguage) -> Vec<Declaration> {
    let declarations = match language {
        LiteLanguage::Php => scan_php(source),
        LiteLanguage::Kotlin => scan_kotlin(source),
        LiteLanguage::Java => scan_java(source),
    };
    tracing::debug!(
        "{} scanner found {} declarations",
        language,
        declarations.len()
    );
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scan_dispatch() {
        let php = scan("<?php\nfunction a() {}\n", LiteLanguage::Php);
        assert_eq!(php[0].name, "a");

        let kotlin = scan("fun b() {}\n", LiteLanguage::Kotlin);
        assert_eq!(kotlin[0].name, "b");

        let java = scan("class C {}\n", LiteLanguage::Java);
        assert_eq!(java[0].name, "C");
    }

    #[test]
    fn test_empty_source() {
        for language in LiteLanguage::ALL {
            assert!(scan("", language).is_empty());
        }
    }

    fn check_outline(declarations: &[Declaration], line_count: usize) {
        let mut previous = 0;
        for (idx, decl) in declarations.iter().enumerate() {
            assert!(decl.start_line >= 1);
            assert!(decl.start_line as usize <= line_count);
            assert!(decl.start_line >= previous, "lines must not decrease");
            previous = decl.start_line;

            if let Some(parent) = decl.parent {
                assert!(parent < idx);
                assert!(declarations[parent].kind.is_container());
                assert!(declarations[parent].start_line < decl.start_line);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_scanners_are_total(
            lines in prop::collection::vec(
                prop_oneof![
                    Just("<?php".to_string()),
                    Just("namespace App;".to_string()),
                    Just("package a.b".to_string()),
                    Just("class A extends B {".to_string()),
                    Just("object O : X {".to_string()),
                    Just("companion object {".to_string()),
                    Just("  public function f($x) {".to_string()),
                    Just("  fun g(a: Int,".to_string()),
                    Just("  public static void main(String[] args) {".to_string()),
                    Just("    if (showSheet) {".to_string()),
                    Just("    $this->run();".to_string()),
                    Just("}".to_string()),
                    Just("{".to_string()),
                    Just("\"unterminated {".to_string()),
                    Just("/* open comment".to_string()),
                    "[ -~]{0,30}",
                ],
                0..40,
            )
        ) {
            let source = lines.join("\n");
            let line_count = source.lines().count();
            for language in LiteLanguage::ALL {
                let declarations = scan(&source, language);
                check_outline(&declarations, line_count);
            }
        }
    }
}
