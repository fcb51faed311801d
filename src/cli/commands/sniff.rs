//! Sniff Command
//!
//! Report which lite scanner would handle a file, with the content scores.

use std::path::Path;

use crate::analyzer::scanner::{SniffScores, sniff_language};
use crate::cli::input::read_source;
use crate::types::Result;

pub fn run(path: Option<&Path>) -> Result<()> {
    let input = read_source(path)?;
    print!("{}", report(&input.text, input.filename.as_deref()));
    Ok(())
}

fn report(source: &str, filename: Option<&str>) -> String {
    let language = sniff_language(source, filename);
    let scores = SniffScores::compute(source);

    let mut output = String::new();
    output.push_str(&format!("{}\n", language.extractor()));
    output.push_str(&format!(
        "Scores: php={} kotlin={} java={}\n",
        scores.php, scores.kotlin, scores.java
    ));
    if let Some(name) = filename {
        output.push_str(&format!("File: {}\n", name));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_php() {
        let text = report("<?php\n$user->save();\n", None);
        assert!(text.starts_with("PHP-lite\n"));
        assert!(text.contains("Scores: php="));
    }

    #[test]
    fn test_report_uses_filename() {
        let text = report("class A {}\n", Some("A.java"));
        assert!(text.starts_with("Java-lite\n"));
        assert!(text.ends_with("File: A.java\n"));
    }
}
