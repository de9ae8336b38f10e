//! Drawing commands (live, run, demo)

use std::path::Path;
use std::process::ExitCode;

use crate::canvas::Canvas;
use crate::clock::FrameClock;
use crate::color::ColorRegistry;
use crate::config::PxtConfig;
use crate::input::InputMapper;
use crate::script::{demo_source, load_script, parse_script, Stage, Statement};
use crate::session::{Session, SessionError};
use crate::sprite::load_or_placeholder;
use crate::terminal::{render_frame_ansi, TerminalEvents, TerminalGuard, TerminalPresenter};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Columns used for headless output when stdout is not a terminal
const HEADLESS_COLUMNS: u16 = 80;

/// Execute the live command
pub fn run_live(config: &PxtConfig) -> ExitCode {
    drive(config, &[], false)
}

/// Execute the run command
pub fn run_script(config: &PxtConfig, path: &Path, headless: bool) -> ExitCode {
    match load_script(path) {
        Ok(script) => drive(config, &script, headless),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the demo command
pub fn run_demo(config: &PxtConfig, headless: bool) -> ExitCode {
    let Some(colors) = registry(config) else {
        return ExitCode::from(EXIT_INVALID_ARGS);
    };
    match parse_script(&demo_source(colors.len())) {
        Ok(script) => drive(config, &script, headless),
        Err(e) => {
            eprintln!("Error: demo script: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn registry(config: &PxtConfig) -> Option<ColorRegistry> {
    match config.color_registry() {
        Ok(colors) => Some(colors),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn drive(config: &PxtConfig, script: &[Statement], headless: bool) -> ExitCode {
    let Some(colors) = registry(config) else {
        return ExitCode::from(EXIT_INVALID_ARGS);
    };
    let sprite = load_or_placeholder(config.sprite_path().as_deref());
    let canvas = Canvas::new(config.board.width, config.board.height).with_colors(colors);

    if headless {
        let canvas = canvas.into_shared();
        let mut stage = Stage::new(&canvas, config.actor_settings(), sprite, FrameClock::unpaced());
        stage.execute(script);
        stage.current();

        let columns = if atty::is(atty::Stream::Stdout) {
            crossterm::terminal::size().map(|(cols, _)| cols).unwrap_or(HEADLESS_COLUMNS)
        } else {
            HEADLESS_COLUMNS
        };
        let canvas = canvas.borrow();
        print!("{}", render_frame_ansi(canvas.frame().image(), columns));
        return ExitCode::from(EXIT_SUCCESS);
    }

    if !atty::is(atty::Stream::Stdin) || !atty::is(atty::Stream::Stdout) {
        eprintln!("Error: {}", SessionError::NotATerminal);
        return ExitCode::from(EXIT_ERROR);
    }

    let guard = match TerminalGuard::enter() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", SessionError::from(e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let canvas = canvas.with_presenter(Box::new(TerminalPresenter::stdout())).into_shared();
    let mut stage = Stage::new(&canvas, config.actor_settings(), sprite, FrameClock::new(config.runtime.fps));
    stage.execute(script);

    let session = Session::new(
        stage.current(),
        TerminalEvents::new(guard.reports_key_release()),
        InputMapper::new(config.turtle.turn_step),
        FrameClock::new(config.runtime.fps),
    );
    let result = session.run();
    drop(guard);

    match result {
        Ok(summary) => {
            tracing::info!(ticks = summary.ticks, paused = summary.paused_ticks, "session ended");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
