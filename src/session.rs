//! The driving loop
//!
//! Each tick polls one batch of input events, hands it to the input mapper
//! (which drives the turtle and, through it, the compositor), acts on the
//! resulting intent and then waits for the next tick boundary.
//!
//! Pausing is handled here rather than in the mapper: while paused, a batch
//! is only scanned for `pause` (resume) and `quit`, and held keys are
//! released so motion does not resume by itself.

use crate::clock::FrameClock;
use crate::input::{scan_intent, EventSource, InputMapper, Intent};
use crate::surface::Surface;
use crate::turtle::Turtle;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("interactive mode needs a terminal; use --headless")]
    NotATerminal,

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// How a session ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub paused_ticks: u64,
}

pub struct Session<'a, S: Surface, E: EventSource> {
    turtle: &'a Turtle<S>,
    events: E,
    mapper: InputMapper,
    clock: FrameClock,
    paused: bool,
}

impl<'a, S: Surface, E: EventSource> Session<'a, S, E> {
    pub fn new(turtle: &'a Turtle<S>, events: E, mapper: InputMapper, clock: FrameClock) -> Self {
        Self {
            turtle,
            events,
            mapper,
            clock,
            paused: false,
        }
    }

    /// Handle one batch of events. Returns `false` once the session should end.
    pub fn step(&mut self) -> io::Result<bool> {
        let batch = self.events.poll_events(self.clock.remaining())?;

        let intent = if self.paused {
            scan_intent(&batch)
        } else {
            let intent = self.mapper.process(&batch, self.turtle);
            let notices = self.mapper.drain_notices();
            if !notices.is_empty() {
                let mut canvas = self.turtle.canvas().borrow_mut();
                for notice in &notices {
                    canvas.presenter_mut().notify(notice);
                }
            }
            intent
        };

        match intent {
            Intent::Quit => {
                tracing::info!("quit requested");
                return Ok(false);
            }
            Intent::Pause => {
                self.paused = !self.paused;
                if self.paused {
                    self.mapper.release_all();
                }
                tracing::info!("{}", if self.paused { "paused" } else { "resumed" });
            }
            Intent::Continue => {}
        }

        self.clock.tick();
        Ok(true)
    }

    /// Run until a quit intent.
    pub fn run(mut self) -> Result<SessionSummary, SessionError> {
        let mut summary = SessionSummary::default();
        loop {
            let was_paused = self.paused;
            if !self.step()? {
                break;
            }
            summary.ticks += 1;
            if was_paused {
                summary.paused_ticks += 1;
            }
        }
        Ok(summary)
    }
}
