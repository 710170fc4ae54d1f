//! Debugger settings: an optional JSON file, overridden by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings for the `mediation-debug` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DebuggerConfig {
    /// Log filter for stderr; `RUST_LOG` applies when unset.
    pub log_level: Option<String>,
    pub no_color: bool,
    /// Also write a session log to the user cache directory.
    pub file_logging: bool,
    pub pretty: bool,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        DebuggerConfig { log_level: None, no_color: false, file_logging: false, pretty: true }
    }
}

/// Values given on the command line; `None` keeps the file's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub no_color: Option<bool>,
    pub file_logging: Option<bool>,
    pub pretty: Option<bool>,
}

impl DebuggerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = serde_json::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise, then applies `overrides`.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => DebuggerConfig::from_file(path)?,
            None => DebuggerConfig::default(),
        };
        Ok(config.with_overrides(overrides))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if overrides.log_level.is_some() {
            self.log_level = overrides.log_level;
        }
        if let Some(no_color) = overrides.no_color {
            self.no_color = no_color;
        }
        if let Some(file_logging) = overrides.file_logging {
            self.file_logging = file_logging;
        }
        if let Some(pretty) = overrides.pretty {
            self.pretty = pretty;
        }
        self
    }
}
