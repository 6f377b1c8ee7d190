//! Configuration loading and management
//!
//! Handles parsing of the optional `config.toml`. Every field has an explicit
//! default; a value from the file or the command line replaces the whole field.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::task::TaskDocument;

/// File name of the task document in the home directory
pub const DEFAULT_TASK_FILE: &str = "tasks.json";

/// File name of the configuration file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Application options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppOptions {
    /// Initial display state of the shell
    #[serde(default)]
    pub state: AppState,

    /// Location of the task file
    #[serde(default = "default_storage_location")]
    pub storage_location: PathBuf,

    /// Document used when the task file does not exist yet
    #[serde(default)]
    pub default_data: TaskDocument,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            state: AppState::default(),
            storage_location: default_storage_location(),
            default_data: TaskDocument::default(),
        }
    }
}

/// Display state of the interactive shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppState {
    /// Show completed tasks in the listing
    #[serde(default = "default_show_completed")]
    pub show_completed: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            show_completed: default_show_completed(),
        }
    }
}

fn default_show_completed() -> bool {
    true
}

fn default_storage_location() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DEFAULT_TASK_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TASK_FILE))
}

/// Per-user config file path, if a config directory can be determined
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tasklist").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl AppOptions {
    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: AppOptions = toml::from_str(&content)?;
        options.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(options)
    }

    /// Load `explicit` if given, otherwise the per-user file if present,
    /// otherwise the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn with_storage_location(mut self, path: PathBuf) -> Self {
        self.storage_location = path;
        self
    }

    pub fn with_show_completed(mut self, show_completed: bool) -> Self {
        self.state.show_completed = show_completed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_location.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "storage_location cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for task in &self.default_data.tasks {
            if task.id.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "default_data.tasks cannot include empty ids".to_string(),
                ));
            }
            if !seen.insert(task.id.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "default_data.tasks has duplicate id '{}'",
                    task.id
                )));
            }
        }

        Ok(())
    }
}
