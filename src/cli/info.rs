//! Info command implementations (colors, keys)

use std::process::ExitCode;

use image::Rgb;

use crate::color::ColorRegistry;
use crate::config::PxtConfig;
use crate::input::HELP_TEXT;
use crate::terminal::{color_to_ansi_bg, ANSI_RESET};

use super::{EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the colors command
pub fn run_colors(config: &PxtConfig) -> ExitCode {
    let registry = match config.color_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let swatches = atty::is(atty::Stream::Stdout);
    for line in color_lines(&registry, swatches) {
        println!("{}", line);
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the keys command
pub fn run_keys() -> ExitCode {
    print!("{}", HELP_TEXT);
    ExitCode::from(EXIT_SUCCESS)
}

fn hex(rgb: Rgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// One line per color in cycling order; the fallback color is starred.
fn color_lines(registry: &ColorRegistry, swatches: bool) -> Vec<String> {
    registry
        .iter()
        .map(|(name, rgb)| {
            let marker = if name == registry.default_name() { '*' } else { ' ' };
            let swatch = if swatches {
                format!("{}    {} ", color_to_ansi_bg(rgb), ANSI_RESET)
            } else {
                String::new()
            };
            format!("{}{} {:<10} {}", swatch, marker, name, hex(rgb))
        })
        .collect()
}
