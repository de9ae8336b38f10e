//! Procedural drawing primitives
//!
//! Composite movements built from two primitives, advance and turn. They
//! work on anything implementing [`Motion`]: a live [`crate::turtle::Turtle`]
//! draws and re-renders at every step, a bare [`ActorState`] only moves.

use crate::actor::ActorState;
use crate::clamp::{clamp_range, Clamped};

pub const MIN_SIDES: i64 = 3;
pub const MAX_SIDES: i64 = 72;

/// Side count used by [`circle`].
pub const CIRCLE_SIDES: i64 = MAX_SIDES;

/// Side length of [`star`] when none is given, in movement units.
pub const STAR_LENGTH: f64 = 20.0;

pub const STAR_ANGLE: f64 = 144.0;

/// Something that can walk forward and turn in place.
pub trait Motion {
    /// Move `units` along the current heading.
    fn advance(&mut self, units: f64);

    /// Rotate by `degrees`, clockwise positive.
    fn turn(&mut self, degrees: f64);

    /// Units-to-pixels multiplier, used to scale default side lengths.
    fn speed(&self) -> u32;
}

impl Motion for ActorState {
    fn advance(&mut self, units: f64) {
        // A bare state has no layer to draw the stroke on
        let _ = ActorState::advance(self, units);
    }

    fn turn(&mut self, degrees: f64) {
        self.rotate(degrees);
    }

    fn speed(&self) -> u32 {
        ActorState::speed(self)
    }
}

/// `times` repetitions of (advance `length`, turn `angle`).
pub fn repeat<M: Motion + ?Sized>(motion: &mut M, times: u32, angle: f64, length: f64) {
    for _ in 0..times {
        motion.advance(length);
        motion.turn(angle);
    }
}

/// Side length used when `n_gon` is not given one: `(speed * 36) / sides`.
pub fn default_side_length(speed: u32, sides: u32) -> f64 {
    (u64::from(speed) * 36 / u64::from(sides.max(1))) as f64
}

/// Draw a regular polygon with `sides` clamped into `[3, 72]`.
///
/// The turn per side is `360 / sides` in whole degrees, so side counts that
/// do not divide 360 do not close exactly. A missing or zero `length` uses
/// [`default_side_length`]. Returns the side count actually drawn.
pub fn n_gon<M: Motion + ?Sized>(motion: &mut M, sides: i64, length: Option<f64>) -> Clamped<u32> {
    let c = clamp_range(sides, MIN_SIDES, MAX_SIDES);
    let sides = c.value as u32;
    if c.clamped {
        tracing::debug!("n_gon side count clamped to {}", sides);
    }

    let turn = (360 / sides) as f64;
    let length = match length {
        Some(l) if l != 0.0 => l,
        _ => default_side_length(motion.speed(), sides),
    };

    repeat(motion, sides, turn, length);
    Clamped { value: sides, clamped: c.clamped }
}

/// Five-pointed star: 5 repetitions of (advance, turn 144).
pub fn star<M: Motion + ?Sized>(motion: &mut M, length: Option<f64>) {
    repeat(motion, 5, STAR_ANGLE, length.unwrap_or(STAR_LENGTH));
}

/// A 72-sided polygon with the default side length.
pub fn circle<M: Motion + ?Sized>(motion: &mut M) {
    n_gon(motion, CIRCLE_SIDES, None);
}
