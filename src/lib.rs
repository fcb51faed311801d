//! minimap - Read-Only Structure Maps for Source Code
//!
//! Turns a pasted source file into a compact outline of its declarations
//! (imports, classes, functions, constants, ...) with exact line numbers,
//! suitable for handing to a reviewer or an LLM without the code itself.
//!
//! ## Extraction Modes
//!
//! - **Python-AST**: full tree-sitter parse; rejects invalid Python
//! - **PHP-lite / Kotlin-lite / Java-lite**: best-effort lexical scanners
//! - **Auto**: Python first, then a sniffed lite scanner on parse failure
//!
//! ## Quick Start
//!
//! ```ignore
//! use minimap::{MapMode, generate_map};
//!
//! let result = generate_map("import os\n\ndef foo(x):\n    return x\n", MapMode::Auto)?;
//! assert!(result.rendered_text.starts_with("Mode: Python-AST"));
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: structural parser, lexical scanners, mode selector, TODO finder
//! - [`redact`]: PII and secret masking
//! - [`render`]: text rendering
//! - [`config`]: layered configuration

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod redact;
pub mod render;
pub mod types;

use std::borrow::Cow;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{MapError, Result};

// Data Model
pub use types::{Declaration, DeclarationKind, Extractor, LiteLanguage, MapMode, MapResult, Modifier};

pub use analyzer::find_todos;
pub use redact::{RedactionCategory, redact};
pub use render::{MapRenderer, RenderOptions, render};

// =============================================================================
// Map Generation
// =============================================================================

/// Options for one map generation run
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub mode: MapMode,
    pub redaction_enabled: bool,
    pub redaction_categories: Vec<RedactionCategory>,
    pub todo_warnings_enabled: bool,
    pub todo_limit: usize,
    /// Sniffing hint, and the `File:` line when the render options set none
    pub filename: Option<String>,
    pub render: RenderOptions,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            mode: MapMode::Auto,
            redaction_enabled: true,
            redaction_categories: RedactionCategory::ALL.to_vec(),
            todo_warnings_enabled: true,
            todo_limit: constants::warnings::DEFAULT_LIMIT,
            filename: None,
            render: RenderOptions::default(),
        }
    }
}

/// Generate a map with default options
pub fn generate_map(source: &str, mode: MapMode) -> Result<MapResult> {
    generate_map_with(
        source,
        &MapOptions {
            mode,
            ..MapOptions::default()
        },
    )
}

/// Generate a map.
///
/// Redaction runs first, so line numbers, TODO text and rendered values
/// all come from the redacted text.
pub fn generate_map_with(source: &str, options: &MapOptions) -> Result<MapResult> {
    if source.trim().is_empty() {
        return Err(MapError::EmptyInput);
    }

    let text: Cow<'_, str> = if options.redaction_enabled {
        Cow::Owned(redact(source, &options.redaction_categories))
    } else {
        Cow::Borrowed(source)
    };

    let selection = analyzer::select(&text, options.mode, options.filename.as_deref())?;

    let warnings = if options.todo_warnings_enabled {
        find_todos(&text, options.todo_limit)
    } else {
        Vec::new()
    };

    let mut render_options = options.render.clone();
    if render_options.filename.is_none() {
        render_options.filename = options.filename.clone();
    }
    let rendered_text = MapRenderer::new(render_options).render(
        selection.mode_used,
        &selection.declarations,
        &warnings,
    );

    tracing::debug!(
        "Generated {} map: {} declarations, {} warnings",
        selection.mode_used,
        selection.declarations.len(),
        warnings.len()
    );

    Ok(MapResult {
        mode_used: selection.mode_used,
        declarations: selection.declarations,
        warnings,
        rendered_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_end_to_end() {
        let result = generate_map(
            "import os\n\ndef foo(x):\n    return x\n",
            MapMode::Explicit(Extractor::PythonAst),
        )
        .unwrap();

        assert_eq!(result.mode_used, Extractor::PythonAst);
        assert_eq!(result.declarations.len(), 2);
        assert_eq!(result.declarations[0].kind, DeclarationKind::Import);
        assert_eq!(result.declarations[0].name, "os");
        assert_eq!(result.declarations[0].start_line, 1);
        assert_eq!(result.declarations[1].kind, DeclarationKind::Function);
        assert_eq!(result.declarations[1].signature.as_deref(), Some("(x)"));
        assert_eq!(result.declarations[1].start_line, 3);
        assert!(result.rendered_text.starts_with("Mode: Python-AST\n"));
    }

    #[test]
    fn test_auto_php_fallback() {
        let result = generate_map("<?php function foo($a) { return $a; }", MapMode::Auto).unwrap();
        assert_eq!(result.mode_used, Extractor::PhpLite);
        let foo = &result.declarations[0];
        assert_eq!((foo.kind, foo.name.as_str(), foo.start_line), (DeclarationKind::Function, "foo", 1));
        assert!(result.rendered_text.starts_with("Mode: PHP-lite\n"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(generate_map("", MapMode::Auto), Err(MapError::EmptyInput)));
        assert!(matches!(generate_map(" \n\t\n", MapMode::Auto), Err(MapError::EmptyInput)));
    }

    #[test]
    fn test_explicit_python_error_propagates() {
        let err = generate_map("def (:\n", MapMode::Explicit(Extractor::PythonAst)).unwrap_err();
        assert!(matches!(err, MapError::Parse { .. }));
    }

    #[test]
    fn test_redaction_toggle() {
        let source = "api_token = \"abc123\"\nowner = \"dev@example.com\"\n";

        let redacted = generate_map(source, MapMode::Auto).unwrap();
        assert!(!redacted.rendered_text.contains("abc123"));
        assert!(redacted.rendered_text.contains("REDACTED_SECRET"));
        assert!(redacted.rendered_text.contains("REDACTED_EMAIL"));

        let options = MapOptions {
            redaction_enabled: false,
            ..MapOptions::default()
        };
        let raw = generate_map_with(source, &options).unwrap();
        assert!(raw.rendered_text.contains("abc123"));
    }

    #[test]
    fn test_redacted_triple_quoted_secret_still_parses() {
        let source = "PASSWORD = \"\"\"\nhunter2\n\"\"\"\n\ndef main():\n    pass\n";

        let result = generate_map(source, MapMode::Auto).unwrap();
        assert_eq!(result.mode_used, Extractor::PythonAst);
        let main = result.declarations.iter().find(|d| d.kind == DeclarationKind::Function).unwrap();
        assert_eq!((main.name.as_str(), main.start_line), ("main", 5));

        let one_line = generate_map("API_TOKEN = \"\"\"s3cr3t\"\"\"\n\ndef main():\n    pass\n", MapMode::Auto).unwrap();
        assert_eq!(one_line.mode_used, Extractor::PythonAst);
        assert!(!one_line.rendered_text.contains("s3cr3t"));
    }

    #[test]
    fn test_redacted_kotlin_raw_string_keeps_later_declarations() {
        let source = "class A {\n    val apiToken = \"\"\"\n        abc\n    \"\"\"\n    fun later() {}\n}\n\nfun top() {}\n";
        let options = MapOptions {
            mode: MapMode::Explicit(Extractor::KotlinLite),
            ..MapOptions::default()
        };

        let result = generate_map_with(source, &options).unwrap();
        let later = result.declarations.iter().find(|d| d.name == "later").unwrap();
        assert_eq!((later.kind, later.start_line, later.parent), (DeclarationKind::Method, 5, Some(0)));
        let top = result.declarations.iter().find(|d| d.name == "top").unwrap();
        assert_eq!((top.kind, top.start_line, top.parent), (DeclarationKind::Function, 8, None));
    }

    #[test]
    fn test_todo_toggle_and_filename() {
        let source = "# TODO: split module\nx = 1\n";

        let with_todos = generate_map(source, MapMode::Auto).unwrap();
        assert_eq!(with_todos.warnings.len(), 1);
        assert!(with_todos.rendered_text.contains("- L1: # TODO: split module"));

        let options = MapOptions {
            todo_warnings_enabled: false,
            filename: Some("tool.py".to_string()),
            ..MapOptions::default()
        };
        let without = generate_map_with(source, &options).unwrap();
        assert!(without.warnings.is_empty());
        assert!(without.rendered_text.contains("\nFile: tool.py\n"));
    }

    #[test]
    fn test_result_serializes() {
        let result = generate_map("def f():\n    pass\n", MapMode::Auto).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["mode_used"], "python-ast");
        assert_eq!(json["declarations"][0]["kind"], "function");
    }
}
