use crate::types::{Declaration, Extractor, MapError, Result};

/// Structural (grammar-backed) extractor.
///
/// Unlike the lexical scanners, a structural parser may reject its input;
/// the selector decides whether that rejection triggers a fallback.
pub trait Parser {
    fn parse(&self, source: &str) -> Result<Vec<Declaration>>;
    fn extractor(&self) -> Extractor;
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// 1-based line of the node's first byte
#[inline]
pub fn node_line(node: tree_sitter::Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// First ERROR or MISSING node in pre-order, if the tree has any
pub fn first_error_node(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_node)
}

/// Create a tree-sitter parser for the given language.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&language.into()).map_err(|e| {
        tracing::warn!("Failed to load {} grammar: {}", lang_name, e);
        MapError::Grammar(format!("Failed to set {} language: {}", lang_name, e))
    })?;
    Ok(parser)
}
