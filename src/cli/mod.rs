//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod info;
mod live;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{check, load_config, merge_cli_overrides, CliOverrides, PxtConfig};
use crate::logging::{init_logging, LogTarget};

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// pxt - Drive turtles around a shared canvas from the keyboard or a script
#[derive(Parser)]
#[command(name = "pxt")]
#[command(about = "Turtle graphics in the terminal: draw with the keyboard or with command scripts")]
#[command(version)]
pub struct Cli {
    /// Config file (default: turtle.toml found upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Frames per second (1-240)
    #[arg(long, global = true)]
    pub fps: Option<u32>,

    /// Pixels per movement unit for new turtles
    #[arg(long, global = true)]
    pub speed: Option<u32>,

    /// Canvas width in pixels
    #[arg(long, global = true)]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long, global = true)]
    pub height: Option<u32>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive keyboard session (the default)
    Live,

    /// Run a command script, then keep driving the last selected turtle
    Run {
        /// Script file, one command per line
        script: PathBuf,

        /// Skip the terminal session and print the final frame
        #[arg(long)]
        headless: bool,
    },

    /// Run the built-in two-turtle demo
    Demo {
        /// Skip the terminal session and print the final frame
        #[arg(long)]
        headless: bool,
    },

    /// List the color registry with swatches
    Colors,

    /// Print the key bindings
    Keys,
}

impl Commands {
    /// Whether the command takes over the terminal.
    fn is_interactive(&self) -> bool {
        match self {
            Commands::Live => true,
            Commands::Run { headless, .. } | Commands::Demo { headless } => !headless,
            Commands::Colors | Commands::Keys => false,
        }
    }
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            fps: self.fps,
            speed: self.speed,
            width: self.width,
            height: self.height,
        }
    }
}

/// Load, override and validate the configuration.
fn configure(cli: &Cli) -> Result<PxtConfig, ExitCode> {
    let mut config = load_config(cli.config.as_deref()).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;
    merge_cli_overrides(&mut config, &cli.overrides());
    check(&config).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;
    Ok(config)
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match configure(&cli) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let command = cli.command.unwrap_or(Commands::Live);
    let target = LogTarget::select(config.log_file().as_deref(), command.is_interactive());
    if let Err(e) = init_logging(config.log.level.as_deref(), &target) {
        eprintln!("Error: cannot open log file: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    match command {
        Commands::Live => live::run_live(&config),
        Commands::Run { script, headless } => live::run_script(&config, &script, headless),
        Commands::Demo { headless } => live::run_demo(&config, headless),
        Commands::Colors => info::run_colors(&config),
        Commands::Keys => info::run_keys(),
    }
}
