//! Source Input
//!
//! Reads the pasted source from a file path or from stdin (`-` or no path).

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::types::Result;

/// Source text plus the name used as a sniffing hint
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub text: String,
    pub filename: Option<String>,
}

/// Read from `path`, or stdin when it is `None` or `-`
pub fn read_source(path: Option<&Path>) -> Result<SourceInput> {
    match path {
        Some(path) if path != Path::new("-") => read_file(path),
        _ => read_from(io::stdin().lock(), None),
    }
}

fn read_file(path: &Path) -> Result<SourceInput> {
    let bytes = fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);
    Ok(SourceInput {
        text: String::from_utf8_lossy(&bytes).into_owned(),
        filename,
    })
}

fn read_from(mut reader: impl Read, filename: Option<String>) -> Result<SourceInput> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(SourceInput {
        text: String::from_utf8_lossy(&bytes).into_owned(),
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_keeps_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("UserService.php");
        fs::write(&path, "<?php\nclass UserService {}\n").unwrap();

        let input = read_source(Some(&path)).unwrap();
        assert_eq!(input.filename.as_deref(), Some("UserService.php"));
        assert!(input.text.starts_with("<?php"));
    }

    #[test]
    fn test_read_invalid_utf8_is_lossy() {
        let input = read_from(&b"x = 1\n\xff\n"[..], None).unwrap();
        assert!(input.text.starts_with("x = 1\n"));
        assert_eq!(input.text.lines().count(), 2);
        assert!(input.filename.is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_source(Some(&temp_dir.path().join("nope.kt"))).unwrap_err();
        assert!(matches!(err, crate::types::MapError::Io(_)));
    }
}
