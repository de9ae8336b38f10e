//! Turtle actor state and motion math
//!
//! [`ActorState`] is the plain data of one turtle plus the primitives that
//! mutate it. Nothing here renders; [`crate::turtle::Turtle`] wraps these
//! primitives and re-composites the canvas after each one.
//!
//! Board coordinates have their origin at the top-left with y growing
//! downward. Heading 0 faces up and headings grow clockwise.

use crate::clamp::{clamp_range, Clamped};
use crate::surface::Surface;

/// Units-to-pixels multiplier for `forward`/`backward`.
pub const DEFAULT_SPEED: u32 = 4;
pub const SPEED_MAX: u32 = 1000;

/// Degrees turned by `left()`/`right()` and by one tick of a held arrow key.
pub const DEFAULT_TURN: f64 = 5.0;

pub const DEFAULT_THICKNESS: u32 = 3;
pub const THICKNESS_MIN: u32 = 1;
pub const THICKNESS_MAX: u32 = 20;

pub const DEFAULT_PEN_COLOR: &str = "red";
pub const DEFAULT_BACKGROUND: &str = "black";

/// Map any heading into `[0, 360)`.
///
/// # Examples
///
/// ```
/// use pixelturtle::actor::normalize_heading;
///
/// assert_eq!(normalize_heading(-90.0), 270.0);
/// assert_eq!(normalize_heading(720.0), 0.0);
/// assert_eq!(normalize_heading(365.0), 5.0);
/// ```
pub fn normalize_heading(heading: f64) -> f64 {
    let normalized = heading.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Screen displacement for `distance` pixels along `heading`.
///
/// Forward is up, so the y component is inverted.
pub fn displacement(heading: f64, distance: f64) -> (f64, f64) {
    let (sin, cos) = heading.to_radians().sin_cos();
    (distance * sin, -distance * cos)
}

/// Initial settings for a new actor.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSettings {
    pub speed: u32,
    pub thickness: u32,
    pub pen_color: String,
    pub background: String,
    pub pen_down: bool,
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            thickness: DEFAULT_THICKNESS,
            pen_color: DEFAULT_PEN_COLOR.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            pen_down: true,
        }
    }
}

/// A pen stroke produced by a movement with the pen down.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub thickness: u32,
    pub color: String,
}

/// Mutable fields of one turtle.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorState {
    position: (f64, f64),
    heading: f64,
    pen_down: bool,
    pen_color: String,
    thickness: u32,
    background: String,
    speed: u32,
    visible: bool,
}

impl ActorState {
    /// A visible actor at `position` facing up.
    pub fn new(position: (f64, f64), settings: &ActorSettings) -> Self {
        Self {
            position,
            heading: 0.0,
            pen_down: settings.pen_down,
            pen_color: settings.pen_color.clone(),
            thickness: clamp_range(settings.thickness, THICKNESS_MIN, THICKNESS_MAX).value,
            background: settings.background.clone(),
            speed: clamp_range(settings.speed, 1, SPEED_MAX).value,
            visible: true,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Heading in degrees. Only guaranteed to be in `[0, 360)` after a render.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn pen_color(&self) -> &str {
        &self.pen_color
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Add `delta` degrees to the heading. Positive turns clockwise.
    pub fn rotate(&mut self, delta: f64) {
        self.heading += delta;
    }

    pub fn set_heading(&mut self, heading: f64) {
        self.heading = heading;
    }

    /// Fold the stored heading into `[0, 360)` and return it.
    pub fn normalize_heading(&mut self) -> f64 {
        self.heading = normalize_heading(self.heading);
        self.heading
    }

    /// Move `units * speed` pixels along the heading.
    ///
    /// Returns the stroke to draw when the pen is down.
    pub fn advance(&mut self, units: f64) -> Option<Stroke> {
        let (dx, dy) = displacement(self.heading, units * self.speed as f64);
        self.move_to(self.position.0 + dx, self.position.1 + dy)
    }

    /// Jump to an absolute position, drawing a connecting stroke when the pen is down.
    pub fn move_to(&mut self, x: f64, y: f64) -> Option<Stroke> {
        let stroke = self.pen_down.then(|| Stroke {
            from: self.position,
            to: (x, y),
            thickness: self.thickness,
            color: self.pen_color.clone(),
        });
        self.position = (x, y);
        stroke
    }

    /// Jump without drawing regardless of pen state.
    pub fn teleport(&mut self, x: f64, y: f64) {
        self.position = (x, y);
    }

    pub fn set_pen_down(&mut self, down: bool) {
        self.pen_down = down;
    }

    pub fn toggle_pen(&mut self) -> bool {
        self.pen_down = !self.pen_down;
        self.pen_down
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn set_pen_color(&mut self, color: impl Into<String>) {
        self.pen_color = color.into();
    }

    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = color.into();
    }

    /// Set the pen thickness, clamped into `[1, 20]`.
    pub fn set_thickness(&mut self, thickness: i64) -> Clamped<u32> {
        let c = clamp_range(thickness, THICKNESS_MIN as i64, THICKNESS_MAX as i64);
        self.thickness = c.value as u32;
        Clamped { value: self.thickness, clamped: c.clamped }
    }

    /// Change the pen thickness by `delta`, clamped into `[1, 20]`.
    pub fn adjust_thickness(&mut self, delta: i64) -> Clamped<u32> {
        self.set_thickness(self.thickness as i64 + delta)
    }

    /// Set the movement multiplier, clamped into `[1, SPEED_MAX]`.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = clamp_range(speed, 1, SPEED_MAX).value;
    }
}

/// A registered actor: its state plus the sprite the compositor draws.
#[derive(Debug, Clone)]
pub struct Actor<S: Surface> {
    pub state: ActorState,
    sprite: S,
    rotated: S,
}

impl<S: Surface> Actor<S> {
    pub fn new(state: ActorState, sprite: S) -> Self {
        let rotated = sprite.rotated(state.heading());
        Self { state, sprite, rotated }
    }

    /// Normalize the heading and rotate the upright sprite to match.
    pub fn refresh_sprite(&mut self) {
        let heading = self.state.normalize_heading();
        self.rotated = self.sprite.rotated(heading);
    }

    /// The sprite as last rotated by [`Actor::refresh_sprite`].
    pub fn rotated_sprite(&self) -> &S {
        &self.rotated
    }

    /// Top-left offset that centers the rotated sprite on the actor position.
    pub fn sprite_origin(&self) -> (i32, i32) {
        let (w, h) = self.rotated.size();
        let (x, y) = self.state.position();
        (x.round() as i32 - (w / 2) as i32, y.round() as i32 - (h / 2) as i32)
    }
}
