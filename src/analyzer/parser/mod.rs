//! Structural Parser Module
//!
//! Tree-sitter based extraction. Python is the only grammar-backed language;
//! everything else goes through the lexical scanners.
//!
//! ```rust,ignore
//! use minimap::analyzer::parser::{Parser, PythonParser};
//!
//! let parser = PythonParser::new()?;
//! let declarations = parser.parse(source)?;
//! ```

pub mod python;
pub mod traits;

pub use python::PythonParser;
pub use traits::{Parser, create_ts_parser, first_error_node, get_node_text, node_line};

use crate::types::{Extractor, MapError, Result};

/// Create the structural parser backing `extractor`.
///
/// Returns an error for lexical extractors, which have no grammar.
pub fn create_parser(extractor: Extractor) -> Result<Box<dyn Parser>> {
    match extractor {
        Extractor::PythonAst => Ok(Box::new(PythonParser::new()?)),
        other => Err(MapError::Grammar(format!(
            "No structural parser for {}",
            other
        ))),
    }
}
