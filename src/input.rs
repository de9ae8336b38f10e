//! Keyboard input to turtle actions
//!
//! Input arrives once per tick as a batch of [`InputEvent`]s. Keys fall into
//! two disjoint groups:
//!
//! - **held motion keys** (left, right, up): key-down adds them to a held
//!   set, key-up removes them, and every tick each held key applies one
//!   increment of turning or movement;
//! - **one-shot actions**: everything else fires once on the key-down edge.
//!
//! The batch yields an [`Intent`] for the driving loop.

use crate::surface::Surface;
use crate::turtle::Turtle;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::io;
use std::time::Duration;

/// Key binding reference shown by the help key and `pxt keys`.
pub const HELP_TEXT: &str = "\
Keys:
  Left / Right      turn while held
  Up                move forward while held
  Down              toggle pen up/down
  , / .             turn left / right 90 degrees
  Space             face up (heading 0)
  0                 return to center
  Backspace         clear the drawing
  - / = (+)         thinner / thicker pen
  z / a             cycle pen / background color
  3 - 9             draw a polygon with that many sides
  c                 draw a circle
  s                 draw a star
  h / ?             show this help
  p                 pause / resume
  Esc               quit";

/// A key, independent of the terminal or windowing backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Left,
    Right,
    Up,
    Down,
    Space,
    Backspace,
    Char(char),
    /// A key the backend could name but that has no binding
    Other(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Escape => write!(f, "Esc"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Space => write!(f, "Space"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Char(c) => write!(f, "'{}'", c),
            Key::Other(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The window or terminal session asked to close
    Close,
    KeyDown(Key),
    KeyUp(Key),
}

/// What the driving loop should do after a tick's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    #[default]
    Continue,
    Pause,
    Quit,
}

/// Non-fatal things input handling wants the user to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Help,
    UnusedKey(Key),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Help => write!(f, "{}", HELP_TEXT),
            Notice::UnusedKey(key) => write!(f, "unused key {}", key),
        }
    }
}

/// Delivers one tick's worth of input events.
pub trait EventSource {
    /// Wait up to `timeout` for input and return everything pending.
    fn poll_events(&mut self, timeout: Duration) -> io::Result<Vec<InputEvent>>;
}

/// Replays prepared batches, one per poll, then reports a close.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedEvents {
    pub fn new(batches: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl EventSource for ScriptedEvents {
    fn poll_events(&mut self, _timeout: Duration) -> io::Result<Vec<InputEvent>> {
        Ok(self.batches.pop_front().unwrap_or_else(|| vec![InputEvent::Close]))
    }
}

/// Continuous-motion keys. Ordering is the per-tick evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeldKey {
    Left,
    Right,
    Up,
}

impl HeldKey {
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Left => Some(HeldKey::Left),
            Key::Right => Some(HeldKey::Right),
            Key::Up => Some(HeldKey::Up),
            _ => None,
        }
    }
}

/// Edge-triggered actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TogglePen,
    CyclePenColor,
    CycleBackground,
    TurnLeft90,
    TurnRight90,
    FaceUp,
    Home,
    Clear,
    ThinnerPen,
    ThickerPen,
    Polygon(u32),
    Circle,
    Star,
    Help,
}

impl Action {
    /// The one-shot action bound to `key`, if any.
    pub fn for_key(key: &Key) -> Option<Self> {
        let action = match key {
            Key::Down => Action::TogglePen,
            Key::Space => Action::FaceUp,
            Key::Backspace => Action::Clear,
            Key::Char('z') => Action::CyclePenColor,
            Key::Char('a') => Action::CycleBackground,
            Key::Char(',') => Action::TurnLeft90,
            Key::Char('.') => Action::TurnRight90,
            Key::Char('0') => Action::Home,
            Key::Char('-') => Action::ThinnerPen,
            Key::Char('=') | Key::Char('+') => Action::ThickerPen,
            Key::Char(c @ '3'..='9') => Action::Polygon(c.to_digit(10).unwrap_or(3)),
            Key::Char('c') => Action::Circle,
            Key::Char('s') => Action::Star,
            Key::Char('h') | Key::Char('?') => Action::Help,
            _ => return None,
        };
        Some(action)
    }
}

/// Intent carried by a single event, ignoring every binding but quit/pause.
fn event_intent(event: &InputEvent) -> Intent {
    match event {
        InputEvent::Close | InputEvent::KeyDown(Key::Escape) => Intent::Quit,
        InputEvent::KeyDown(Key::Char('p')) => Intent::Pause,
        _ => Intent::Continue,
    }
}

/// Combine intents from one batch. Quit outranks pause.
fn strongest(a: Intent, b: Intent) -> Intent {
    match (a, b) {
        (Intent::Quit, _) | (_, Intent::Quit) => Intent::Quit,
        (Intent::Pause, _) | (_, Intent::Pause) => Intent::Pause,
        _ => Intent::Continue,
    }
}

/// Scan a batch for quit/pause only. Used while the loop is paused.
pub fn scan_intent(events: &[InputEvent]) -> Intent {
    events.iter().map(event_intent).fold(Intent::Continue, strongest)
}

/// Per-session input state.
#[derive(Debug, Clone)]
pub struct InputMapper {
    held: BTreeSet<HeldKey>,
    turn_step: f64,
    notices: Vec<Notice>,
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new(crate::actor::DEFAULT_TURN)
    }
}

impl InputMapper {
    /// `turn_step` is the number of degrees one tick of a held turn key rotates.
    pub fn new(turn_step: f64) -> Self {
        Self {
            held: BTreeSet::new(),
            turn_step,
            notices: Vec::new(),
        }
    }

    /// Keys currently held, in evaluation order.
    pub fn held(&self) -> impl Iterator<Item = HeldKey> + '_ {
        self.held.iter().copied()
    }

    /// Forget all held keys, e.g. when focus is lost or the loop pauses.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Take the notices produced since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Handle one tick's events, then apply held-key motion.
    pub fn process<S: Surface>(&mut self, events: &[InputEvent], turtle: &Turtle<S>) -> Intent {
        let mut intent = Intent::Continue;

        for event in events {
            intent = strongest(intent, event_intent(event));

            match event {
                InputEvent::Close => {}
                InputEvent::KeyDown(key) => self.key_down(key, turtle),
                InputEvent::KeyUp(key) => {
                    if let Some(held) = HeldKey::from_key(key) {
                        self.held.remove(&held);
                    }
                }
            }
        }

        for key in self.held.iter() {
            match key {
                HeldKey::Left => turtle.rotate(-self.turn_step),
                HeldKey::Right => turtle.rotate(self.turn_step),
                HeldKey::Up => turtle.forward(1.0),
            }
        }

        if intent != Intent::Continue {
            tracing::debug!("input intent: {:?}", intent);
        }
        intent
    }

    fn key_down<S: Surface>(&mut self, key: &Key, turtle: &Turtle<S>) {
        if matches!(key, Key::Escape | Key::Char('p')) {
            return;
        }

        if let Some(held) = HeldKey::from_key(key) {
            self.held.insert(held);
            return;
        }

        match Action::for_key(key) {
            Some(action) => self.apply(action, turtle),
            None => {
                tracing::debug!("unused key down: {}", key);
                self.notices.push(Notice::UnusedKey(key.clone()));
            }
        }
    }

    fn apply<S: Surface>(&mut self, action: Action, turtle: &Turtle<S>) {
        match action {
            Action::TogglePen => {
                turtle.toggle_pen();
            }
            Action::CyclePenColor => {
                turtle.cycle_pen_color();
            }
            Action::CycleBackground => {
                turtle.cycle_background_color();
            }
            Action::TurnLeft90 => turtle.left(90.0),
            Action::TurnRight90 => turtle.right(90.0),
            Action::FaceUp => turtle.set_heading(0.0),
            Action::Home => turtle.home(),
            Action::Clear => turtle.clear(None),
            Action::ThinnerPen => {
                turtle.adjust_thickness(-1);
            }
            Action::ThickerPen => {
                turtle.adjust_thickness(1);
            }
            Action::Polygon(sides) => {
                turtle.n_gon(sides as i64, None);
            }
            Action::Circle => turtle.circle(),
            Action::Star => turtle.star(None),
            Action::Help => self.notices.push(Notice::Help),
        }
    }
}
