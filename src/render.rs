//! Map Renderer
//!
//! Formats a declaration outline as the plain-text structure map:
//!
//! ```text
//! Mode: PHP-lite
//! File: UserService.php
//! Rule: This is a structure map. Do NOT rewrite code.
//! Rule: Ask for a specific function/class block when needed.
//!
//! - namespace App\Service  [L2]
//!     - class UserService extends Base  [final]  [L7]
//!         - function find(int $id) : ?User  [protected, static]  [L14]
//!
//! ## Warnings (TODO/FIXME/HACK/TEMP)
//! - L21: // TODO cache lookups
//! ```
//!
//! Output depends only on its inputs, so rendering is idempotent.

use serde::{Deserialize, Serialize};

use crate::constants::render::{
    DEFAULT_MAX_DECLARATIONS, ENTRY_POINT_NAMES, ENTRY_POINT_PREFIXES, INDENT, RULES,
    WARNINGS_HEADING,
};
use crate::types::{Declaration, DeclarationKind, Extractor, Modifier, nesting_depth};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Emits a `File:` line when set
    pub filename: Option<String>,
    /// Emits the two `Rule:` lines
    pub include_rules: bool,
    /// Declarations rendered before the `(+N more declarations)` line
    pub max_declarations: usize,
    /// Python only: list `main`, `run_*`, `entry_*` and `cli_*` functions
    /// (with their nested declarations) before everything else
    pub entry_points_first: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            filename: None,
            include_rules: true,
            max_declarations: DEFAULT_MAX_DECLARATIONS,
            entry_points_first: false,
        }
    }
}

pub struct MapRenderer {
    options: RenderOptions,
}

impl MapRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(
        &self,
        mode_used: Extractor,
        declarations: &[Declaration],
        warnings: &[Declaration],
    ) -> String {
        let mut output = String::new();

        // Header
        output.push_str(&format!("Mode: {}\n", mode_used));
        if let Some(ref filename) = self.options.filename {
            output.push_str(&format!("File: {}\n", filename));
        }
        if self.options.include_rules {
            for rule in RULES {
                output.push_str(rule);
                output.push('\n');
            }
        }
        output.push('\n');

        // Outline
        let order = if self.options.entry_points_first && mode_used == Extractor::PythonAst {
            entry_first_order(declarations)
        } else {
            (0..declarations.len()).collect()
        };
        let shown = declarations.len().min(self.options.max_declarations);
        for &index in order.iter().take(shown) {
            let decl = &declarations[index];
            let depth = nesting_depth(declarations, index);
            output.push_str(&INDENT.repeat(depth));
            output.push_str("- ");
            output.push_str(&declaration_line(mode_used, decl));
            output.push('\n');
        }
        if declarations.len() > shown {
            output.push_str(&format!(
                "- ... (+{} more declarations)\n",
                declarations.len() - shown
            ));
        }

        // Warnings
        if !warnings.is_empty() {
            output.push('\n');
            output.push_str(WARNINGS_HEADING);
            output.push('\n');
            for warning in warnings {
                output.push_str(&format!(
                    "- L{}: {}\n",
                    warning.start_line,
                    warning.detail.as_deref().unwrap_or(&warning.name)
                ));
            }
        }

        output
    }
}

/// Render with default options
pub fn render(mode_used: Extractor, declarations: &[Declaration], warnings: &[Declaration]) -> String {
    MapRenderer::new(RenderOptions::default()).render(mode_used, declarations, warnings)
}

fn is_entry_point(decl: &Declaration) -> bool {
    decl.kind == DeclarationKind::Function
        && decl.parent.is_none()
        && (ENTRY_POINT_NAMES.contains(&decl.name.as_str())
            || ENTRY_POINT_PREFIXES.iter().any(|p| decl.name.starts_with(p)))
}

/// Index of the top-level declaration that `index` is nested under
fn root_of(declarations: &[Declaration], index: usize) -> usize {
    let mut current = index;
    while let Some(parent) = declarations[current].parent {
        if parent >= current {
            break;
        }
        current = parent;
    }
    current
}

/// Display order with entry-point subtrees moved to the front.
/// Each subtree stays contiguous, so indentation still follows `parent`.
fn entry_first_order(declarations: &[Declaration]) -> Vec<usize> {
    let (entries, rest): (Vec<usize>, Vec<usize>) = (0..declarations.len())
        .partition(|&i| is_entry_point(&declarations[root_of(declarations, i)]));
    entries.into_iter().chain(rest).collect()
}

/// Keyword introducing a callable, if the language has one
fn callable_keyword(mode: Extractor) -> Option<&'static str> {
    match mode {
        Extractor::PythonAst => Some("def"),
        Extractor::PhpLite => Some("function"),
        Extractor::KotlinLite => Some("fun"),
        Extractor::JavaLite => None,
    }
}

fn declaration_line(mode: Extractor, decl: &Declaration) -> String {
    let mut line = declaration_body(mode, decl);

    // A Composable tag would repeat the @Composable annotation
    let tags: Vec<&str> = decl
        .modifiers
        .iter()
        .filter(|m| {
            !(**m == Modifier::Composable && decl.annotations.iter().any(|a| a == "@Composable"))
        })
        .map(Modifier::as_str)
        .collect();
    if !tags.is_empty() {
        line.push_str(&format!("  [{}]", tags.join(", ")));
    }

    line.push_str(&format!("  [L{}]", decl.start_line));

    if !decl.annotations.is_empty() {
        line.push_str(&format!(" {}", decl.annotations.join(", ")));
    }
    if !decl.calls.is_empty() {
        line.push_str(&format!("  calls: {}", decl.calls.join(", ")));
    }
    line
}

fn declaration_body(mode: Extractor, decl: &Declaration) -> String {
    let name = decl.name.as_str();
    let signature = decl.signature.as_deref().unwrap_or_default();
    let detail = decl.detail.as_deref();

    match decl.kind {
        DeclarationKind::Import => match (mode, detail) {
            (Extractor::PythonAst, Some(names)) => format!("from {} import {}", name, names),
            (Extractor::PhpLite, Some(kind)) => format!("use {} {}", kind, name),
            (Extractor::PhpLite, None) => format!("use {}", name),
            _ => format!("import {}", name),
        },
        DeclarationKind::Namespace => match mode {
            Extractor::PhpLite => format!("namespace {}", name),
            _ => format!("package {}", name),
        },
        DeclarationKind::Constant => match detail {
            Some(form) => format!("{} {}{}", form, name, signature),
            None => format!("const {}{}", name, signature),
        },
        DeclarationKind::Global => match detail {
            Some(value) => format!("{}{} = {}", name, signature, value),
            None => format!("{}{}", name, signature),
        },
        DeclarationKind::Class => {
            format!("{} {}{}", detail.unwrap_or("class"), name, signature)
        }
        DeclarationKind::Function | DeclarationKind::Method => {
            let keyword = detail.or(callable_keyword(mode));
            match keyword {
                Some(keyword) => format!("{} {}{}", keyword, name, signature),
                None => format!("{}{}", name, signature),
            }
        }
        DeclarationKind::LocalFunction => match callable_keyword(mode) {
            Some(keyword) => format!("local {} {}{}", keyword, name, signature),
            None => format!("local {}{}", name, signature),
        },
        DeclarationKind::StateVariable => match detail {
            Some(source) => format!("state {} ({})", name, source),
            None => format!("state {}", name),
        },
        DeclarationKind::EffectBlock => format!("effect {}{}", name, signature),
        DeclarationKind::UiGuard => format!("guard {}", name),
        DeclarationKind::CallHint => format!("call {}{}()", signature, name),
        DeclarationKind::TodoMarker => match detail {
            Some(text) => format!("{}: {}", name, text),
            None => name.to_string(),
        },
    }
}
