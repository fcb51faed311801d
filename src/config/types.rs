//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/minimap/) and project (.minimap/) level configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{render, warnings};
use crate::redact::RedactionCategory;
use crate::render::RenderOptions;
use crate::types::{MapError, MapMode, Result};
use crate::MapOptions;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Extraction and rendering settings
    pub map: MapConfig,

    /// Redaction settings
    pub redaction: RedactionConfig,

    /// CLI output settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            map: MapConfig::default(),
            redaction: RedactionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `MapError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.map.todo_limit == 0 {
            return Err(MapError::Config(
                "map.todo_limit must be greater than 0".to_string(),
            ));
        }

        if self.map.max_declarations == 0 {
            return Err(MapError::Config(
                "map.max_declarations must be greater than 0".to_string(),
            ));
        }

        if self.redaction.categories.is_empty() && self.map.redaction_enabled {
            return Err(MapError::Config(
                "redaction.categories must not be empty while redaction is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Map generation options derived from this configuration
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            mode: self.map.mode,
            redaction_enabled: self.map.redaction_enabled,
            redaction_categories: self.redaction.categories.clone(),
            todo_warnings_enabled: self.map.todo_warnings_enabled,
            todo_limit: self.map.todo_limit,
            filename: None,
            render: RenderOptions {
                filename: None,
                include_rules: self.map.include_rules,
                max_declarations: self.map.max_declarations,
                entry_points_first: self.map.entry_points_first,
            },
        }
    }
}

// =============================================================================
// Map Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Requested mode: auto, python-ast, php-lite, kotlin-lite, java-lite
    pub mode: MapMode,

    /// Mask PII and secret literals before extraction
    pub redaction_enabled: bool,

    /// Append the TODO/FIXME/HACK/TEMP block
    pub todo_warnings_enabled: bool,

    pub todo_limit: usize,

    /// Emit the two `Rule:` lines under the header
    pub include_rules: bool,

    pub max_declarations: usize,

    /// Python maps list `main`, `run_*`, `entry_*` and `cli_*` functions first
    pub entry_points_first: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            mode: MapMode::Auto,
            redaction_enabled: true,
            todo_warnings_enabled: true,
            todo_limit: warnings::DEFAULT_LIMIT,
            include_rules: true,
            max_declarations: render::DEFAULT_MAX_DECLARATIONS,
            entry_points_first: false,
        }
    }
}

// =============================================================================
// Redaction Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub categories: Vec<RedactionCategory>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                RedactionCategory::Email,
                RedactionCategory::Phone,
                RedactionCategory::NationalId,
                RedactionCategory::Secret,
            ],
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Copy the rendered map to the clipboard after printing
    pub auto_copy: bool,

    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            auto_copy: false,
            format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rendered structure map
    #[default]
    Text,
    /// Full `MapResult` as JSON
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format '{}'. Valid values: text, json", s)),
        }
    }
}
