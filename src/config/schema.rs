//! Configuration schema types for `canvas.toml`
//!
//! Defines the structure and validation rules for editor configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::render::MAX_UPSCALE;
use crate::storage::DEFAULT_KEY;

/// Where the editor document is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the file store
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Key the document is stored under
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".pixel-canvas")
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { dir: default_dir(), key: default_key() }
    }
}

/// Debounced saving
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Quiet period before a save, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    3000
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms() }
    }
}

impl BackupConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// PNG export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output pixels per grid cell for upscaled exports
    #[serde(default = "default_upscale_factor")]
    pub upscale_factor: u32,
}

fn default_upscale_factor() -> u32 {
    10
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { upscale_factor: default_upscale_factor() }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// A single configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "backup.debounce_ms")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "canvas.toml: '{}' {}", self.field, self.message)
    }
}

impl CanvasConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.storage.key.is_empty() {
            errors.push(ConfigValidationError {
                field: "storage.key".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.backup.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "backup.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if !(1..=MAX_UPSCALE).contains(&self.export.upscale_factor) {
            errors.push(ConfigValidationError {
                field: "export.upscale_factor".to_string(),
                message: format!("must be between 1 and {}", MAX_UPSCALE),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: CanvasConfig = toml::from_str("").unwrap();
        assert_eq!(config, CanvasConfig::default());
        assert_eq!(config.storage.dir, PathBuf::from(".pixel-canvas"));
        assert_eq!(config.storage.key, "@pixel-canvas/editor");
        assert_eq!(config.backup.debounce_ms, 3000);
        assert_eq!(config.export.upscale_factor, 10);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[storage]
dir = "/var/lib/canvas"
key = "drawing"

[backup]
debounce_ms = 250

[export]
upscale_factor = 4
"#;
        let config: CanvasConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("/var/lib/canvas"));
        assert_eq!(config.storage.key, "drawing");
        assert_eq!(config.backup.debounce(), Duration::from_millis(250));
        assert_eq!(config.export.upscale_factor, 4);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: CanvasConfig = toml::from_str("[storage]\ndir = \"x\"\n").unwrap();
        assert_eq!(config.storage.key, DEFAULT_KEY);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(toml::from_str::<CanvasConfig>("[wallet]\naddress = \"x\"\n").is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = CanvasConfig::default();
        config.storage.key.clear();
        config.backup.debounce_ms = 0;
        config.export.upscale_factor = 65;

        let errors = config.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["storage.key", "backup.debounce_ms", "export.upscale_factor"]);
        assert_eq!(
            errors[1].to_string(),
            "canvas.toml: 'backup.debounce_ms' must be a positive integer"
        );
    }

    #[test]
    fn test_upscale_bounds() {
        let mut config = CanvasConfig::default();
        config.export.upscale_factor = 0;
        assert!(!config.is_valid());
        config.export.upscale_factor = 1;
        assert!(config.is_valid());
        config.export.upscale_factor = 64;
        assert!(config.is_valid());
    }
}
