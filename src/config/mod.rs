//! Configuration for the turtle runtime
//!
//! Provides types, discovery and loading for `turtle.toml`.

pub mod loader;
pub mod schema;

pub use loader::{check, find_config, load_config, merge_cli_overrides, CliOverrides, ConfigError, CONFIG_FILE};
pub use schema::*;
