//! Configuration management for the permission form.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{PermissionLevel, TargetKind};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/dsacl/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Form defaults
    pub form: FormConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `DSACL_DEFAULT_PERMISSION`: permission level selected on a fresh form
    /// - `DSACL_DEFAULT_TARGET`: target kind selected on a fresh form
    /// - `DSACL_LOG`: tracing filter directives
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// An unknown level or target kind is an error, not ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DSACL_DEFAULT_PERMISSION") {
            self.form.default_permission =
                val.parse::<PermissionLevel>()
                    .map_err(|e| ConfigError::InvalidValue {
                        field: "form.default_permission".to_string(),
                        reason: e.to_string(),
                    })?;
            tracing::debug!(
                "Override form.default_permission from env: {}",
                self.form.default_permission
            );
        }

        if let Some(val) = lookup("DSACL_DEFAULT_TARGET") {
            self.form.default_target =
                val.parse::<TargetKind>()
                    .map_err(|e| ConfigError::InvalidValue {
                        field: "form.default_target".to_string(),
                        reason: e.to_string(),
                    })?;
            tracing::debug!(
                "Override form.default_target from env: {}",
                self.form.default_target
            );
        }

        if let Some(val) = lookup("DSACL_LOG") {
            tracing::debug!("Override logging.filter from env: {}", val);
            self.logging.filter = val;
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> ConfigResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/dsacl/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "dsacl", "dsacl").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Defaults a fresh form starts from and resets to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Permission level preselected in the level picker
    pub default_permission: PermissionLevel,
    /// Target kind preselected in the kind selector
    #[serde(with = "target_kind_lowercase")]
    pub default_target: TargetKind,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            default_permission: PermissionLevel::least_privileged(),
            default_target: TargetKind::Team,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,dsacl=debug".to_string(),
        }
    }
}

mod target_kind_lowercase {
    use crate::types::TargetKind;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(kind: &TargetKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&kind.display_name().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TargetKind, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
