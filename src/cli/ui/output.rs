use console::style;

/// Status lines for the CLI.
///
/// Everything goes to stderr; stdout carries only the map.
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", style("✓").green(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", style("ℹ").blue(), message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
