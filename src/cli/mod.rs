pub mod clipboard;
pub mod commands;
pub mod input;
pub mod ui;

pub use clipboard::copy_text;
pub use input::{SourceInput, read_source};
