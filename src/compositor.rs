//! Frame composition
//!
//! Every state-changing turtle primitive ends in [`render`], which redraws
//! the whole frame:
//!
//! 1. normalize the rendering actor's heading
//! 2. rotate its sprite to match
//! 3. fill the frame with the rendering actor's background color
//! 4. blit the persistent pen layer
//! 5. blit every visible live actor's sprite, in registration order
//! 6. hand the frame to the presenter
//!
//! The frame buffer carries no state between renders: it is rebuilt from the
//! pen layer and the actors each time.

use crate::actor::{Actor, ActorState};
use crate::canvas::Canvas;
use crate::input::Notice;
use crate::surface::Surface;
use std::cell::RefCell;
use std::rc::Rc;

/// Summary of the actor that triggered a frame, for status displays.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub heading: f64,
    pub position: (f64, f64),
    pub pen_down: bool,
    pub pen_color: String,
    pub background: String,
    pub thickness: u32,
    pub speed: u32,
    pub actors: usize,
}

impl FrameInfo {
    pub fn new(state: &ActorState, actors: usize) -> Self {
        Self {
            heading: state.heading(),
            position: state.position(),
            pen_down: state.is_pen_down(),
            pen_color: state.pen_color().to_string(),
            background: state.background().to_string(),
            thickness: state.thickness(),
            speed: state.speed(),
            actors,
        }
    }
}

/// Receives finished frames.
pub trait Presenter<S> {
    /// Show a freshly composited frame.
    fn present(&mut self, frame: &S, info: &FrameInfo);

    /// Surface a notice from input handling (help request, unused key).
    fn notify(&mut self, _notice: &Notice) {}
}

/// Discards frames. Used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl<S> Presenter<S> for NullPresenter {
    fn present(&mut self, _frame: &S, _info: &FrameInfo) {}
}

/// Records the info of every presented frame and every notice.
///
/// Clones share one log, so a test can keep a handle while the canvas owns
/// the presenter.
#[derive(Debug, Default, Clone)]
pub struct RecordingPresenter {
    frames: Rc<RefCell<Vec<FrameInfo>>>,
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<FrameInfo> {
        self.frames.borrow().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl<S> Presenter<S> for RecordingPresenter {
    fn present(&mut self, _frame: &S, info: &FrameInfo) {
        self.frames.borrow_mut().push(info.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

/// Re-render the canvas on behalf of `actor`.
pub fn render<S: Surface>(canvas: &RefCell<Canvas<S>>, actor: &Rc<RefCell<Actor<S>>>) {
    actor.borrow_mut().refresh_sprite();
    let state = actor.borrow().state.clone();
    composite(&mut canvas.borrow_mut(), &state);
}

/// Steps 3 to 6: rebuild and present the frame using `rendering`'s background.
pub fn composite<S: Surface>(canvas: &mut Canvas<S>, rendering: &ActorState) {
    let background = canvas.colors().rgb(rendering.background());
    canvas.frame.fill(background);
    canvas.frame.blit(&canvas.layer, 0, 0);

    let actors = canvas.live_actors();
    for actor in &actors {
        let Ok(actor) = actor.try_borrow() else {
            tracing::debug!("skipping actor busy during composite");
            continue;
        };
        if !actor.state.is_visible() {
            continue;
        }
        let (x, y) = actor.sprite_origin();
        canvas.frame.blit(actor.rotated_sprite(), x, y);
    }

    canvas.frames += 1;
    let info = FrameInfo::new(rendering, actors.len());
    canvas.presenter.present(&canvas.frame, &info);
}
