//! Code Analyzer Module
//!
//! Turns source text into an ordered declaration outline:
//! - Structural parsing (tree-sitter, Python)
//! - Lexical scanning (PHP, Kotlin, Java) with language sniffing
//! - Mode selection with structural-to-lexical fallback
//! - TODO marker collection

pub mod parser;
pub mod scanner;
pub mod selector;
pub mod todo;

pub use selector::{ModeSelector, Selection, SelectorState, select};
pub use todo::find_todos;
