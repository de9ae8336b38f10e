//! The shared drawing canvas
//!
//! A canvas owns the visible frame buffer, the persistent pen layer, the
//! color registry and the presenter. Actors sharing the canvas register
//! themselves; the canvas keeps only weak references to them, so an actor
//! that is dropped simply stops being composited.

use crate::actor::{Actor, Stroke};
use crate::color::ColorRegistry;
use crate::compositor::{NullPresenter, Presenter};
use crate::surface::{Raster, Surface};
use image::Rgb;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Board size used when none is configured.
pub const DEFAULT_BOARD: (u32, u32) = (640, 480);

/// Largest accepted board width or height.
pub const MAX_BOARD_SIDE: u32 = 4096;

/// Reserved color the pen layer is filled with and keyed on.
///
/// Pixels of this color are see-through when the layer is blitted, so the
/// background fill shows wherever nothing has been drawn.
pub const LAYER_KEY: Rgb<u8> = Rgb([1, 2, 3]);

pub type SharedActor<S = Raster> = Rc<RefCell<Actor<S>>>;
pub type SharedCanvas<S = Raster> = Rc<RefCell<Canvas<S>>>;

pub struct Canvas<S: Surface = Raster> {
    size: (u32, u32),
    pub(crate) frame: S,
    pub(crate) layer: S,
    colors: ColorRegistry,
    actors: Vec<Weak<RefCell<Actor<S>>>>,
    pub(crate) presenter: Box<dyn Presenter<S>>,
    pub(crate) frames: u64,
}

impl<S: Surface> Canvas<S> {
    /// A canvas with the built-in colors, a clear pen layer and no presenter.
    ///
    /// Each side is clamped into `[1, MAX_BOARD_SIDE]`.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.clamp(1, MAX_BOARD_SIDE), height.clamp(1, MAX_BOARD_SIDE));
        let mut canvas = Self {
            size: (width, height),
            frame: S::new(width, height),
            layer: S::new(width, height),
            colors: ColorRegistry::new(),
            actors: Vec::new(),
            presenter: Box::new(NullPresenter),
            frames: 0,
        };
        canvas.clear_layer();
        canvas
    }

    pub fn with_colors(mut self, colors: ColorRegistry) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_presenter(mut self, presenter: Box<dyn Presenter<S>>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn into_shared(self) -> SharedCanvas<S> {
        Rc::new(RefCell::new(self))
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Center of the board, where new and reset actors are placed.
    pub fn center(&self) -> (f64, f64) {
        ((self.size.0 / 2) as f64, (self.size.1 / 2) as f64)
    }

    pub fn colors(&self) -> &ColorRegistry {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut ColorRegistry {
        &mut self.colors
    }

    /// The most recently composited frame.
    pub fn frame(&self) -> &S {
        &self.frame
    }

    /// The persistent pen layer.
    pub fn layer(&self) -> &S {
        &self.layer
    }

    /// Number of frames composited so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn presenter_mut(&mut self) -> &mut dyn Presenter<S> {
        self.presenter.as_mut()
    }

    /// Add an actor to the composite order. Later registrations draw on top.
    pub fn register(&mut self, actor: &Rc<RefCell<Actor<S>>>) {
        self.actors.retain(|weak| weak.strong_count() > 0);
        self.actors.push(Rc::downgrade(actor));
    }

    /// Actors still alive, in registration order.
    pub fn live_actors(&self) -> Vec<Rc<RefCell<Actor<S>>>> {
        self.actors.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.iter().filter(|weak| weak.strong_count() > 0).count()
    }

    /// Replace the pen layer with a fresh, fully see-through one.
    pub fn clear_layer(&mut self) {
        let (width, height) = self.size;
        let mut layer = S::new(width, height);
        layer.fill(LAYER_KEY);
        layer.set_colorkey(Some(LAYER_KEY));
        self.layer = layer;
    }

    /// Draw a pen stroke onto the persistent layer.
    pub fn draw_stroke(&mut self, stroke: &Stroke) {
        let color = self.colors.lookup(&stroke.color);
        if color.is_fallback() {
            tracing::debug!("unknown pen color '{}', drawing in {}", stroke.color, self.colors.default_name());
        }
        self.layer.draw_line(stroke.from, stroke.to, stroke.thickness, color.rgb());
    }
}
