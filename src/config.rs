//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treexpert/treexpert.toml`
//! 3. Local config: `<dir>/.treexpert.toml`
//! 4. Environment variables: `TREEXPERT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_dir: Option<PathBuf>,
    pub store_file: Option<String>,
    pub default_kind: Option<String>,
    pub full_result: Option<bool>,
}

/// Unified configuration for treexpert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base directory for treexpert data (default: ~/.treexpert)
    pub base_dir: PathBuf,
    /// Store snapshot file name, relative to `base_dir`
    pub store_file: String,
    /// Tree kind used when a command names none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_kind: Option<String>,
    /// Emit full criteria instead of the short form
    pub full_result: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: dirs_default_base_dir(),
            store_file: "store.json".into(),
            default_kind: None,
            full_result: false,
        }
    }
}

/// Get the default base directory (~/.treexpert).
fn dirs_default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".treexpert"))
        .unwrap_or_else(|| PathBuf::from("~/.treexpert"))
}

/// Get the XDG config directory for treexpert.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treexpert").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treexpert.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treexpert.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unexpandable input is kept as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Full path of the store snapshot.
    pub fn store_path(&self) -> PathBuf {
        self.base_dir.join(&self.store_file)
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.base_dir.to_string_lossy().as_ref());
        self.base_dir = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            base_dir: overlay
                .base_dir
                .clone()
                .unwrap_or_else(|| self.base_dir.clone()),
            store_file: overlay
                .store_file
                .clone()
                .unwrap_or_else(|| self.store_file.clone()),
            default_kind: overlay
                .default_kind
                .clone()
                .or_else(|| self.default_kind.clone()),
            full_result: overlay.full_result.unwrap_or(self.full_result),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.treexpert.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local_dir)
    }

    /// Load settings from an explicit global file and local directory.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply TREEXPERT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TREEXPERT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("base_dir") {
            settings.base_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("store_file") {
            settings.store_file = val;
        }
        if let Ok(val) = config.get_string("default_kind") {
            settings.default_kind = Some(val);
        }
        if let Ok(val) = config.get_bool("full_result") {
            settings.full_result = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treexpert configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treexpert/treexpert.toml
#   Local:  <dir>/.treexpert.toml
#   Env:    TREEXPERT_* environment variables

# Base directory for treexpert data
# base_dir = "~/.treexpert"

# Store snapshot file inside base_dir
# store_file = "store.json"

# Tree kind used when a command names none (else the first kind)
# default_kind = "credit"

# Print full criteria for decisions
# full_result = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
