//! Configuration loading and discovery for `turtle.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PxtConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked for during discovery.
pub const CONFIG_FILE: &str = "turtle.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse turtle.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub fps: Option<u32>,
    pub speed: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Find turtle.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for turtle.toml
/// 2. Check XDG_CONFIG_HOME/pixelturtle/turtle.toml (or ~/.config/pixelturtle/turtle.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find turtle.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pixelturtle").join(CONFIG_FILE);
    config_path.exists().then_some(config_path)
}

/// Find turtle.toml by walking up from a specific directory.
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

/// Load configuration from a turtle.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PxtConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(PxtConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<PxtConfig, ConfigError> {
    tracing::info!("loading config from {}", path.display());
    let contents = fs::read_to_string(path)?;
    let mut config: PxtConfig = toml::from_str(&contents)?;
    config.root = path.parent().map(Path::to_path_buf);

    check(&config)?;
    Ok(config)
}

/// Fail with every validation problem at once.
pub fn check(config: &PxtConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PxtConfig, overrides: &CliOverrides) {
    if let Some(fps) = overrides.fps {
        config.runtime.fps = fps;
    }
    if let Some(speed) = overrides.speed {
        config.turtle.speed = speed;
    }
    if let Some(width) = overrides.width {
        config.board.width = width;
    }
    if let Some(height) = overrides.height {
        config.board.height = height;
    }
}
