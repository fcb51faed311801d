//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/minimap/config.toml)
//! 3. Project config (.minimap/config.toml)
//! 4. Environment variables (MINIMAP_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigScope, default_config_toml};
pub use types::*;
