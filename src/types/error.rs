//! Unified Error Type
//!
//! Every fallible operation in the crate returns [`MapError`]. Lexical scanners,
//! the redactor and the renderer are total and never produce one.
//!
//! ## Fallback Routing
//!
//! The mode selector consults [`MapError::should_fallback`] to decide whether a
//! structural failure hands the source over to a lexical scanner.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Extraction Errors
    // -------------------------------------------------------------------------
    /// Source violates the Python grammar
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u32, message: String },

    /// tree-sitter grammar could not be loaded
    #[error("Grammar error: {0}")]
    Grammar(String),

    #[error("Input is empty")]
    EmptyInput,

    // -------------------------------------------------------------------------
    // Surface Errors
    // -------------------------------------------------------------------------
    #[error("Clipboard write failed: {0}")]
    ClipboardWrite(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MapError>;

impl MapError {
    /// Create a parse error at a 1-based line
    pub fn parse(line: u32, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Check if this error should hand the source to a lexical scanner
    pub fn should_fallback(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Grammar(_))
    }

    /// Line number attached to the error, if any
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
