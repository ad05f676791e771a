//! Configuration loading and discovery for `canvas.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::CanvasConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "canvas.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse canvas.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override storage directory
    pub session_dir: Option<PathBuf>,
    /// Override export upscale factor
    pub upscale_factor: Option<u32>,
}

/// Find canvas.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for canvas.toml
/// 2. Check XDG_CONFIG_HOME/pixel-canvas/canvas.toml (or ~/.config/pixel-canvas/canvas.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find canvas.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pixel-canvas").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find canvas.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a canvas.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the
/// default configuration.
///
/// A relative `storage.dir` in a discovered file is resolved against the
/// directory holding that file.
pub fn load_config(path: Option<&Path>) -> Result<CanvasConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

fn load_config_file(path: &Path) -> Result<CanvasConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: CanvasConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = config_root(path) {
        config.storage.dir = resolve_path(root, &config.storage.dir);
    }
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Default configuration when no canvas.toml is found.
pub fn default_config() -> CanvasConfig {
    CanvasConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The result is
/// validated again, since an override can be out of range too.
pub fn merge_cli_overrides(
    config: &mut CanvasConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(ref dir) = overrides.session_dir {
        config.storage.dir = dir.clone();
    }

    if let Some(upscale_factor) = overrides.upscale_factor {
        config.export.upscale_factor = upscale_factor;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}

/// Directory holding a config file.
pub fn config_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Resolve a path relative to the config root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the root.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
