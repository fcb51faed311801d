//! Config Command
//!
//! Manage minimap configuration.
//!
//! Usage:
//!   minimap config show [-f json|toml]
//!   minimap config path
//!   minimap config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader, ConfigPaths, ConfigScope};
use crate::types::{MapError, Result};

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::discover().load()?;
    println!("{}", render_config(&config, format)?);
    Ok(())
}

fn render_config(config: &Config, format: &str) -> Result<String> {
    match format.to_lowercase().as_str() {
        "json" => Ok(serde_json::to_string_pretty(config)?),
        "toml" | "text" => {
            toml::to_string_pretty(config).map_err(|e| MapError::Config(e.to_string()))
        }
        other => Err(MapError::Config(format!(
            "Invalid format '{}'. Valid values: toml, json",
            other
        ))),
    }
}

/// Show configuration paths
pub fn path() -> Result<()> {
    println!("Configuration paths:");
    println!();
    print!("{}", describe_paths(&ConfigPaths::discover()));
    Ok(())
}

fn describe_paths(paths: &ConfigPaths) -> String {
    let mut out = String::new();
    for (scope, path) in paths.layers() {
        let label = format!("{}:", capitalize(&scope.to_string()));
        match path {
            Some(path) => {
                let mark = if path.exists() { "✓" } else { "✗" };
                out.push_str(&format!("  {:<8} {} {}\n", label, mark, path.display()));
            }
            None => out.push_str(&format!("  {:<8} (not available)\n", label)),
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Initialize global or project configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let scope = if global {
        ConfigScope::Global
    } else {
        ConfigScope::Project
    };
    let (config_path, written) = ConfigLoader::init(scope, force)?;

    let output = Output::new();
    if written {
        output.success(&format!("Initialized {} configuration", scope));
    } else {
        output.warning(&format!(
            "{} configuration already exists (use --force to overwrite)",
            capitalize(&scope.to_string())
        ));
    }
    output.info(&format!("Config: {}", config_path.display()));
    Ok(())
}
