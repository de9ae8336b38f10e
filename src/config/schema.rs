//! Configuration schema types for `turtle.toml`
//!
//! Every section and key is optional; a missing file and an empty file give
//! the same defaults.

use crate::actor::{
    ActorSettings, DEFAULT_BACKGROUND, DEFAULT_PEN_COLOR, DEFAULT_SPEED, DEFAULT_THICKNESS, DEFAULT_TURN, SPEED_MAX,
};
use crate::canvas::{DEFAULT_BOARD, MAX_BOARD_SIDE};
use crate::clock::{DEFAULT_FPS, MAX_FPS};
use crate::color::{parse_color, ColorError, ColorRegistry};
use crate::sprite::DEFAULT_SPRITE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Board (canvas) dimensions in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    DEFAULT_BOARD.0
}

fn default_height() -> u32 {
    DEFAULT_BOARD.1
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Driving loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Ticks per second
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

/// Initial state of every new turtle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurtleConfig {
    #[serde(default = "default_speed")]
    pub speed: u32,
    /// Degrees per tick of a held turn key
    #[serde(default = "default_turn_step")]
    pub turn_step: f64,
    /// Clamped to [1, 20] when applied
    #[serde(default = "default_thickness")]
    pub thickness: u32,
    #[serde(default = "default_pen_color")]
    pub pen_color: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_true")]
    pub pen_down: bool,
    /// Sprite image; `turtle.png` is tried when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<PathBuf>,
}

fn default_speed() -> u32 {
    DEFAULT_SPEED
}

fn default_turn_step() -> f64 {
    DEFAULT_TURN
}

fn default_thickness() -> u32 {
    DEFAULT_THICKNESS
}

fn default_pen_color() -> String {
    DEFAULT_PEN_COLOR.to_string()
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            turn_step: default_turn_step(),
            thickness: default_thickness(),
            pen_color: default_pen_color(),
            background: default_background(),
            pen_down: true,
            sprite: None,
        }
    }
}

/// Extra colors merged over the built-in registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorsConfig {
    /// Name of the color unknown lookups fall back to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Color name to hex or CSS color string
    #[serde(flatten)]
    pub entries: BTreeMap<String, String>,
}

/// Diagnostics output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `warn` or `pixelturtle=debug`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Append logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Complete turtle.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PxtConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub turtle: TurtleConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Directory of the file this was loaded from; relative paths resolve here
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "colors.orange")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "turtle.toml: '{}' {}", self.field, self.message)
    }
}

impl PxtConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut error = |field: &str, message: String| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message,
            })
        };

        if self.board.width == 0 || self.board.width > MAX_BOARD_SIDE {
            error("board.width", format!("must be between 1 and {}", MAX_BOARD_SIDE));
        }
        if self.board.height == 0 || self.board.height > MAX_BOARD_SIDE {
            error("board.height", format!("must be between 1 and {}", MAX_BOARD_SIDE));
        }

        if self.runtime.fps == 0 || self.runtime.fps > MAX_FPS {
            error("runtime.fps", format!("must be between 1 and {}", MAX_FPS));
        }

        if self.turtle.speed == 0 || self.turtle.speed > SPEED_MAX {
            error("turtle.speed", format!("must be between 1 and {}", SPEED_MAX));
        }
        if !self.turtle.turn_step.is_finite() {
            error("turtle.turn_step", "must be a finite number".to_string());
        }

        for (name, value) in &self.colors.entries {
            if let Err(e) = parse_color(value) {
                error(&format!("colors.{}", name), format!("is not a color: {}", e));
            }
        }
        if let Some(default) = &self.colors.default {
            let builtin = ColorRegistry::new().contains(default);
            if !builtin && !self.colors.entries.contains_key(default) {
                error("colors.default", format!("names unknown color '{}'", default));
            }
        }

        if let Some(level) = &self.log.level {
            if let Err(e) = tracing_subscriber::EnvFilter::try_new(level) {
                error("log.level", format!("is not a valid filter: {}", e));
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Settings for newly created turtles.
    pub fn actor_settings(&self) -> ActorSettings {
        ActorSettings {
            speed: self.turtle.speed,
            thickness: self.turtle.thickness,
            pen_color: self.turtle.pen_color.clone(),
            background: self.turtle.background.clone(),
            pen_down: self.turtle.pen_down,
        }
    }

    /// The built-in colors with `[colors]` merged over them.
    pub fn color_registry(&self) -> Result<ColorRegistry, ColorError> {
        let mut registry = ColorRegistry::new();
        for (name, value) in &self.colors.entries {
            registry.register_str(name.as_str(), value)?;
        }
        if let Some(default) = &self.colors.default {
            registry.set_default(default.as_str());
        }
        Ok(registry)
    }

    /// Resolve a possibly relative path against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The sprite to load, if any.
    ///
    /// An explicit `turtle.sprite` is always returned so a bad path gets
    /// reported; the default `turtle.png` only when it exists.
    pub fn sprite_path(&self) -> Option<PathBuf> {
        match &self.turtle.sprite {
            Some(path) => Some(self.resolve(path)),
            None => {
                let path = self.resolve(Path::new(DEFAULT_SPRITE));
                path.exists().then_some(path)
            }
        }
    }

    /// Log file path resolved against the config file's directory.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log.file.as_deref().map(|path| self.resolve(path))
    }
}
