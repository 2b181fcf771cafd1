//! Configuration loading, validation, and management for Navigator.
//!
//! Loads configuration from `~/.navigator/config.toml` with environment
//! variable overrides. Validates all settings at load time.

use navigator_core::DEFAULT_ELEMENT_ATTRIBUTES;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Overrides `snapshots.dir`.
pub const ENV_SNAPSHOTS_DIR: &str = "NAVIGATOR_SNAPSHOTS_DIR";
/// Overrides `context.max_history_steps`.
pub const ENV_MAX_HISTORY_STEPS: &str = "NAVIGATOR_MAX_HISTORY_STEPS";

/// The root configuration structure.
///
/// Maps directly to `~/.navigator/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Per-step context assembly
    #[serde(default)]
    pub context: ContextConfig,

    /// Prompt snapshot persistence
    #[serde(default)]
    pub snapshots: SnapshotConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Attribute names surfaced per interactive element.
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,

    /// Render only the most recent N history steps. Unset = all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history_steps: Option<usize>,
}

fn default_attributes() -> Vec<String> {
    DEFAULT_ELEMENT_ATTRIBUTES
        .iter()
        .map(|a| a.to_string())
        .collect()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            attributes: default_attributes(),
            max_history_steps: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Write every assembled prompt to disk.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_snapshots_dir")]
    pub dir: PathBuf,
}

fn default_snapshots_dir() -> PathBuf {
    PathBuf::from("dom_snapshots")
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_snapshots_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.navigator/config.toml).
    ///
    /// Environment variables override file values:
    /// - `NAVIGATOR_SNAPSHOTS_DIR`
    /// - `NAVIGATOR_MAX_HISTORY_STEPS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = lookup(ENV_SNAPSHOTS_DIR) {
            tracing::debug!(dir = %dir, "Snapshot directory overridden from environment");
            self.snapshots.dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_MAX_HISTORY_STEPS) {
            let steps = raw.trim().parse::<usize>().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "{ENV_MAX_HISTORY_STEPS} must be a positive integer, got {raw:?}"
                ))
            })?;
            self.context.max_history_steps = Some(steps);
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".navigator")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.context.attributes.is_empty() {
            return Err(ConfigError::ValidationError(
                "context.attributes must list at least one attribute".into(),
            ));
        }

        let mut seen = HashSet::new();
        for attr in &self.context.attributes {
            if attr.is_empty() || attr.chars().any(char::is_whitespace) {
                return Err(ConfigError::ValidationError(format!(
                    "context.attributes contains an invalid name: {attr:?}"
                )));
            }
            if !seen.insert(attr.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "context.attributes lists {attr:?} more than once"
                )));
            }
        }

        if self.context.max_history_steps == Some(0) {
            return Err(ConfigError::ValidationError(
                "context.max_history_steps must be > 0 when set".into(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as TOML (for `navigator config`).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.context.attributes,
            vec!["id", "name", "type", "value", "placeholder", "href"]
        );
        assert_eq!(config.context.max_history_steps, None);
        assert!(!config.snapshots.enabled);
        assert_eq!(config.snapshots.dir, PathBuf::from("dom_snapshots"));
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig {
            context: ContextConfig {
                max_history_steps: Some(12),
                ..ContextConfig::default()
            },
            ..AppConfig::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[snapshots]\nenabled = true\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.snapshots.enabled);
        assert_eq!(config.snapshots.dir, PathBuf::from("dom_snapshots"));
        assert_eq!(config.context, ContextConfig::default());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert_eq!(result.unwrap(), AppConfig::default());
    }

    #[test]
    fn unparseable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[context\nattributes = 3").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn invalid_attribute_lists_rejected() {
        for attrs in [vec![], vec!["id", "id"], vec!["id", ""], vec!["aria label"]] {
            let config = AppConfig {
                context: ContextConfig {
                    attributes: attrs.iter().map(|a| a.to_string()).collect(),
                    max_history_steps: None,
                },
                ..AppConfig::default()
            };
            assert!(config.validate().is_err(), "{attrs:?} should be rejected");
        }
    }

    #[test]
    fn zero_history_window_rejected() {
        let config = AppConfig {
            context: ContextConfig {
                max_history_steps: Some(0),
                ..ContextConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_SNAPSHOTS_DIR, "/var/lib/navigator"),
            (ENV_MAX_HISTORY_STEPS, " 8 "),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.snapshots.dir, PathBuf::from("/var/lib/navigator"));
        assert_eq!(config.context.max_history_steps, Some(8));
    }

    #[test]
    fn bad_env_override_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(|k| (k == ENV_MAX_HISTORY_STEPS).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_HISTORY_STEPS));

        let err = config
            .apply_env_overrides(|k| (k == ENV_MAX_HISTORY_STEPS).then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
