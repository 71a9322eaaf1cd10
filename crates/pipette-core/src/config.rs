use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use pipette_util::dirs_path;
use pipette_util::errors::PipetteError;

/// Default package index.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/simple";

/// Global user configuration loaded from `~/.pipette/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub python: PythonConfig,
}

/// Package index settings from `[index]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_url")]
    pub url: String,
    #[serde(default, rename = "allow-prereleases")]
    pub allow_prereleases: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            allow_prereleases: false,
        }
    }
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}

/// Installer defaults from `[install]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default, rename = "no-dependencies")]
    pub no_dependencies: bool,
    #[serde(default)]
    pub quiet: bool,
}

/// Interpreter selection from `[python]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PythonConfig {
    #[serde(default = "default_python")]
    pub executable: String,
    #[serde(default, rename = "site-packages")]
    pub site_packages: Option<PathBuf>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            executable: default_python(),
            site_packages: None,
        }
    }
}

fn default_python() -> String {
    if cfg!(windows) {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}

impl GlobalConfig {
    /// Load the global configuration from `~/.pipette/config.toml`, or return
    /// defaults if the file doesn't exist. Environment overrides are applied.
    pub fn load() -> miette::Result<Self> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &std::path::Path) -> Result<Self, PipetteError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| PipetteError::Config {
            message: format!("Failed to read global config: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| PipetteError::Config {
            message: format!("Failed to parse global config: {e}"),
        })
    }

    /// Apply `PIPETTE_INDEX_URL` and `PIPETTE_PYTHON`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("PIPETTE_INDEX_URL").filter(|v| !v.is_empty()) {
            self.index.url = url;
        }
        if let Some(python) = var("PIPETTE_PYTHON").filter(|v| !v.is_empty()) {
            self.python.executable = python;
        }
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}
