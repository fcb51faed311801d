//! Clipboard Copy
//!
//! The system clipboard is opened, written and released within one call.

use arboard::Clipboard;

use crate::types::{MapError, Result};

/// Copy text to the system clipboard
pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()
        .map_err(|e| MapError::ClipboardWrite(format!("Failed to access clipboard: {}", e)))?;
    clipboard
        .set_text(text)
        .map_err(|e| MapError::ClipboardWrite(format!("Failed to copy to clipboard: {}", e)))?;
    Ok(())
}
