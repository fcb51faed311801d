//! Layered Configuration Loading
//!
//! Later layers win:
//!
//! | Layer    | Source                                   |
//! |----------|------------------------------------------|
//! | defaults | `Config::default()`                      |
//! | global   | `$XDG_CONFIG_HOME/minimap/config.toml`   |
//! | project  | `.minimap/config.toml` in the working dir |
//! | env      | `MINIMAP_<SECTION>__<KEY>`               |

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{MapError, Result};

const APP_DIR: &str = "minimap";
const PROJECT_DIR: &str = ".minimap";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "MINIMAP_";

/// A file-backed configuration layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Global,
    Project,
}

impl ConfigScope {
    /// Directory that holds this scope's `config.toml`.
    /// `None` for the global scope when neither XDG_CONFIG_HOME nor HOME is set.
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            Self::Global => env::var_os("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
                .map(|base| base.join(APP_DIR)),
            Self::Project => Some(PathBuf::from(PROJECT_DIR)),
        }
    }

    pub fn file(self) -> Option<PathBuf> {
        self.dir().map(|dir| dir.join(CONFIG_FILE))
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Project => write!(f, "project"),
        }
    }
}

/// Config file locations in merge order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub global: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn discover() -> Self {
        Self {
            global: ConfigScope::Global.file(),
            project: ConfigScope::Project.file(),
        }
    }

    /// Each scope with its path, if one could be resolved
    pub fn layers(&self) -> [(ConfigScope, Option<&Path>); 2] {
        [
            (ConfigScope::Global, self.global.as_deref()),
            (ConfigScope::Project, self.project.as_deref()),
        ]
    }
}

/// Merges defaults, config files and environment into a validated [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    paths: ConfigPaths,
    read_env: bool,
}

impl ConfigLoader {
    pub fn new(paths: ConfigPaths) -> Self {
        Self {
            paths,
            read_env: true,
        }
    }

    /// Loader over the standard global and project locations
    pub fn discover() -> Self {
        Self::new(ConfigPaths::discover())
    }

    /// Skip the `MINIMAP_` environment layer
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        for (scope, path) in self.paths.layers() {
            if let Some(path) = path
                && path.is_file()
            {
                debug!("Merging {} config: {}", scope, path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        if self.read_env {
            // MINIMAP_MAP__TODO_LIMIT -> map.todo_limit
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));
        }
        figment
    }

    pub fn load(&self) -> Result<Config> {
        let config: Config = self
            .figment()
            .extract()
            .map_err(|e| MapError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config for `scope`.
    ///
    /// Returns the file path and whether it was written; an existing file is
    /// kept unless `force` is set.
    pub fn init(scope: ConfigScope, force: bool) -> Result<(PathBuf, bool)> {
        let dir = scope.dir().ok_or_else(|| {
            MapError::Config(format!("Cannot determine {} config directory", scope))
        })?;
        write_default(&dir, force)
    }
}

/// Default configuration as commented TOML
pub fn default_config_toml() -> Result<String> {
    let body = toml::to_string_pretty(&Config::default())
        .map_err(|e| MapError::Config(e.to_string()))?;
    Ok(format!(
        "# minimap configuration\n\
         # .minimap/config.toml overrides the global file; MINIMAP_<SECTION>__<KEY> overrides both.\n\
         # map.mode: auto, python-ast, php-lite, kotlin-lite, java-lite\n\
         # output.format: text, json\n\n{}",
        body
    ))
}

fn write_default(dir: &Path, force: bool) -> Result<(PathBuf, bool)> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        info!("Keeping existing config: {}", path.display());
        return Ok((path, false));
    }

    fs::create_dir_all(dir)?;
    fs::write(&path, default_config_toml()?)?;
    info!("Wrote config: {}", path.display());
    Ok((path, true))
}
