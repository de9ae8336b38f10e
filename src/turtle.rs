//! The turtle handle
//!
//! A [`Turtle`] is one registered actor bound to a shared canvas. Every
//! primitive mutates the actor's state, draws any resulting pen stroke onto
//! the persistent layer and then re-renders the whole canvas.
//!
//! ```
//! use pixelturtle::actor::ActorSettings;
//! use pixelturtle::canvas::Canvas;
//! use pixelturtle::sprite::placeholder_glyph;
//! use pixelturtle::turtle::Turtle;
//!
//! let canvas = Canvas::new(640, 480).into_shared();
//! let tom = Turtle::new(&canvas, &ActorSettings::default(), placeholder_glyph(15));
//! tom.forward(10.0);
//! assert_eq!(tom.position(), (320.0, 200.0));
//! ```

use crate::actor::{Actor, ActorSettings, ActorState, Stroke};
use crate::canvas::{SharedActor, SharedCanvas};
use crate::clamp::Clamped;
use crate::compositor;
use crate::input::HELP_TEXT;
use crate::patterns::{self, Motion};
use crate::surface::{Raster, Surface};
use image::Rgb;
use std::cell::RefCell;
use std::rc::Rc;

pub struct Turtle<S: Surface = Raster> {
    actor: SharedActor<S>,
    canvas: SharedCanvas<S>,
}

impl<S: Surface> Turtle<S> {
    /// Create a turtle at the center of `canvas`, facing up, and render it.
    pub fn new(canvas: &SharedCanvas<S>, settings: &ActorSettings, sprite: S) -> Self {
        let center = canvas.borrow().center();
        let actor = Rc::new(RefCell::new(Actor::new(ActorState::new(center, settings), sprite)));
        canvas.borrow_mut().register(&actor);

        let turtle = Self {
            actor,
            canvas: Rc::clone(canvas),
        };
        turtle.refresh();
        turtle
    }

    pub fn canvas(&self) -> &SharedCanvas<S> {
        &self.canvas
    }

    pub fn actor(&self) -> &SharedActor<S> {
        &self.actor
    }

    /// Snapshot of the actor's state.
    pub fn state(&self) -> ActorState {
        self.actor.borrow().state.clone()
    }

    pub fn position(&self) -> (f64, f64) {
        self.actor.borrow().state.position()
    }

    pub fn heading(&self) -> f64 {
        self.actor.borrow().state.heading()
    }

    pub fn is_pen_down(&self) -> bool {
        self.actor.borrow().state.is_pen_down()
    }

    pub fn is_visible(&self) -> bool {
        self.actor.borrow().state.is_visible()
    }

    pub fn pen_color(&self) -> String {
        self.actor.borrow().state.pen_color().to_string()
    }

    pub fn background(&self) -> String {
        self.actor.borrow().state.background().to_string()
    }

    pub fn thickness(&self) -> u32 {
        self.actor.borrow().state.thickness()
    }

    pub fn speed(&self) -> u32 {
        self.actor.borrow().state.speed()
    }

    /// Re-composite the canvas on behalf of this turtle.
    pub fn refresh(&self) {
        compositor::render(&self.canvas, &self.actor);
    }

    /// Apply `change` to the state, then render. The actor borrow ends first.
    fn update<R>(&self, change: impl FnOnce(&mut ActorState) -> R) -> R {
        let result = change(&mut self.actor.borrow_mut().state);
        self.refresh();
        result
    }

    /// Like [`Turtle::update`], drawing the stroke the change produced.
    fn travel(&self, change: impl FnOnce(&mut ActorState) -> Option<Stroke>) {
        let stroke = change(&mut self.actor.borrow_mut().state);
        if let Some(stroke) = stroke {
            self.canvas.borrow_mut().draw_stroke(&stroke);
        }
        self.refresh();
    }

    /// Turn by `delta` degrees; positive is clockwise.
    pub fn rotate(&self, delta: f64) {
        self.update(|s| s.rotate(delta));
    }

    /// Turn counter-clockwise by `degrees`.
    pub fn left(&self, degrees: f64) {
        self.rotate(-degrees);
    }

    /// Turn clockwise by `degrees`.
    pub fn right(&self, degrees: f64) {
        self.rotate(degrees);
    }

    pub fn about_face(&self) {
        self.rotate(180.0);
    }

    pub fn set_heading(&self, heading: f64) {
        self.update(|s| s.set_heading(heading));
    }

    /// Move `units * speed` pixels along the heading, drawing when the pen is down.
    pub fn forward(&self, units: f64) {
        self.travel(|s| s.advance(units));
    }

    pub fn backward(&self, units: f64) {
        self.forward(-units);
    }

    /// Move to an absolute position under the same pen rule as `forward`.
    pub fn move_to(&self, x: f64, y: f64) {
        self.travel(|s| s.move_to(x, y));
    }

    pub fn pen_down(&self) {
        self.update(|s| s.set_pen_down(true));
    }

    pub fn pen_up(&self) {
        self.update(|s| s.set_pen_down(false));
    }

    /// Flip the pen and return whether it is now down.
    pub fn toggle_pen(&self) -> bool {
        self.update(ActorState::toggle_pen)
    }

    pub fn show(&self) {
        self.update(|s| s.set_visible(true));
    }

    pub fn hide(&self) {
        self.update(|s| s.set_visible(false));
    }

    /// Flip visibility and return whether the turtle is now shown.
    pub fn toggle_visibility(&self) -> bool {
        self.update(ActorState::toggle_visibility)
    }

    /// Face up at the center of the canvas. Nothing is drawn.
    pub fn reset(&self) {
        let center = self.canvas.borrow().center();
        self.update(|s| {
            s.set_heading(0.0);
            s.teleport(center.0, center.1);
        });
    }

    /// Return to the center without changing heading. Nothing is drawn.
    pub fn home(&self) {
        let center = self.canvas.borrow().center();
        self.update(|s| s.teleport(center.0, center.1));
    }

    /// Erase all drawing, optionally switching this turtle's background.
    ///
    /// Position and heading are untouched.
    pub fn clear(&self, background: Option<&str>) {
        self.canvas.borrow_mut().clear_layer();
        match background {
            Some(color) => self.update(|s| s.set_background(color)),
            None => self.refresh(),
        }
    }

    /// The registry color following `current`, wrapping at the end.
    pub fn cycle_color(&self, current: &str) -> String {
        self.canvas.borrow().colors().cycle(current)
    }

    /// Advance the pen color to the next registry entry and return it.
    pub fn cycle_pen_color(&self) -> String {
        let next = self.cycle_color(&self.pen_color());
        self.update(|s| s.set_pen_color(next.as_str()));
        next
    }

    /// Advance the background color to the next registry entry and return it.
    pub fn cycle_background_color(&self) -> String {
        let next = self.cycle_color(&self.background());
        self.update(|s| s.set_background(next.as_str()));
        next
    }

    /// Unknown names are accepted; they draw in the registry's default color.
    pub fn set_pen_color(&self, color: &str) {
        self.update(|s| s.set_pen_color(color));
    }

    pub fn set_background_color(&self, color: &str) {
        self.update(|s| s.set_background(color));
    }

    pub fn set_thickness(&self, thickness: i64) -> Clamped<u32> {
        self.update(|s| s.set_thickness(thickness))
    }

    pub fn adjust_thickness(&self, delta: i64) -> Clamped<u32> {
        self.update(|s| s.adjust_thickness(delta))
    }

    pub fn set_speed(&self, speed: u32) {
        self.update(|s| s.set_speed(speed));
    }

    /// Register or overwrite a color in the shared registry.
    pub fn add_color(&self, name: &str, rgb: (i32, i32, i32)) -> Clamped<Rgb<u8>> {
        self.canvas.borrow_mut().colors_mut().register(name, rgb)
    }

    /// `times` repetitions of (forward `length`, rotate `angle`).
    pub fn repeat(&self, times: u32, angle: f64, length: f64) {
        let mut motion = self;
        patterns::repeat(&mut motion, times, angle, length);
    }

    /// Regular polygon, `sides` clamped into `[3, 72]`.
    pub fn n_gon(&self, sides: i64, length: Option<f64>) -> Clamped<u32> {
        let mut motion = self;
        patterns::n_gon(&mut motion, sides, length)
    }

    pub fn star(&self, length: Option<f64>) {
        let mut motion = self;
        patterns::star(&mut motion, length);
    }

    pub fn circle(&self) {
        let mut motion = self;
        patterns::circle(&mut motion);
    }

    /// Key-binding reference text.
    pub fn help(&self) -> &'static str {
        HELP_TEXT
    }
}

impl<S: Surface> Motion for &Turtle<S> {
    fn advance(&mut self, units: f64) {
        self.forward(units);
    }

    fn turn(&mut self, degrees: f64) {
        self.rotate(degrees);
    }

    fn speed(&self) -> u32 {
        Turtle::speed(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, LAYER_KEY};
    use crate::compositor::RecordingPresenter;

    fn near(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6
    }

    fn board() -> (SharedCanvas, RecordingPresenter) {
        let recorder = RecordingPresenter::new();
        let canvas = Canvas::new(640, 480).with_presenter(Box::new(recorder.clone())).into_shared();
        (canvas, recorder)
    }

    fn turtle(canvas: &SharedCanvas) -> Turtle {
        Turtle::new(canvas, &ActorSettings::default(), Raster::new(5, 5))
    }

    fn layer_rgb(canvas: &SharedCanvas, x: i32, y: i32) -> Option<Rgb<u8>> {
        canvas.borrow().layer().rgb_at(x, y)
    }

    #[test]
    fn test_new_turtle_is_centered_and_rendered() {
        let (canvas, recorder) = board();
        let t = turtle(&canvas);
        assert_eq!(t.position(), (320.0, 240.0));
        assert_eq!(t.heading(), 0.0);
        assert!(t.is_pen_down());
        assert_eq!(recorder.frame_count(), 1);
        assert_eq!(canvas.borrow().actor_count(), 1);
    }

    #[test]
    fn test_forward_draws_red_line() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        t.set_speed(1);
        t.forward(10.0);

        assert!(near(t.position(), (320.0, 230.0)));
        assert_eq!(layer_rgb(&canvas, 320, 235), Some(Rgb([255, 0, 0])));
        assert_eq!(layer_rgb(&canvas, 330, 235), Some(LAYER_KEY));
    }

    #[test]
    fn test_rotate_then_forward() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        t.set_speed(1);
        t.rotate(90.0);
        t.forward(10.0);
        assert_eq!(t.heading(), 90.0);
        assert!(near(t.position(), (330.0, 240.0)));
    }

    #[test]
    fn test_every_mutation_renders() {
        let (canvas, recorder) = board();
        let t = turtle(&canvas);
        t.left(10.0);
        t.pen_up();
        t.forward(1.0);
        t.hide();
        assert_eq!(recorder.frame_count(), 5);
        assert!(!recorder.frames()[4].pen_down);
    }

    #[test]
    fn test_heading_normalized_on_render() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        t.left(30.0);
        assert_eq!(t.heading(), 330.0);
        t.right(810.0);
        assert_eq!(t.heading(), 60.0);
    }

    #[test]
    fn test_pen_up_move_leaves_layer_clear() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        t.pen_up();
        t.forward(5.0);
        assert_eq!(layer_rgb(&canvas, 320, 230), Some(LAYER_KEY));
    }

    #[test]
    fn test_reset_and_home_do_not_draw() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        t.pen_up();
        t.move_to(100.0, 100.0);
        t.pen_down();
        t.rotate(45.0);

        t.home();
        assert_eq!(t.position(), (320.0, 240.0));
        assert_eq!(t.heading(), 45.0);
        assert_eq!(layer_rgb(&canvas, 210, 170), Some(LAYER_KEY));

        t.move_to(10.0, 10.0);
        t.reset();
        assert_eq!(t.position(), (320.0, 240.0));
        assert_eq!(t.heading(), 0.0);
    }

    #[test]
    fn test_clear_keeps_position_and_can_set_background() {
        let (canvas, recorder) = board();
        let t = turtle(&canvas);
        t.forward(5.0);
        let before = t.position();

        t.clear(Some("blue"));
        assert_eq!(t.position(), before);
        assert_eq!(t.background(), "blue");
        assert_eq!(layer_rgb(&canvas, 320, 230), Some(LAYER_KEY));
        assert_eq!(recorder.frames().last().map(|f| f.background.clone()), Some("blue".to_string()));
        assert_eq!(canvas.borrow().frame().rgb_at(0, 0), Some(Rgb([0, 0, 255])));
    }

    #[test]
    fn test_cycle_pen_color_visits_all_colors() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        let total = canvas.borrow().colors().len();
        let start = t.pen_color();

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..total {
            seen.insert(t.cycle_pen_color());
        }
        assert_eq!(seen.len(), total);
        assert_eq!(t.pen_color(), start);
    }

    #[test]
    fn test_cycle_background_color() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        // Sorted order: black -> blue
        assert_eq!(t.cycle_background_color(), "blue");
        assert_eq!(t.background(), "blue");
    }

    #[test]
    fn test_add_color_clamps_and_is_shared() {
        let (canvas, _) = board();
        let tom = turtle(&canvas);
        let sam = turtle(&canvas);

        let stored = tom.add_color("this", (-1, 1000, 345));
        assert!(stored.clamped);
        assert_eq!(stored.value, Rgb([0, 255, 255]));
        assert_eq!(sam.canvas().borrow().colors().rgb("this"), Rgb([0, 255, 255]));
    }

    #[test]
    fn test_unknown_pen_color_draws_default() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        t.set_pen_color("no-such-color");
        t.forward(3.0);
        assert_eq!(layer_rgb(&canvas, 320, 235), Some(Rgb([255, 255, 255])));
    }

    #[test]
    fn test_square_returns_to_start() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        t.rotate(10.0);
        t.n_gon(4, Some(12.0));
        assert!(near(t.position(), (320.0, 240.0)));
        assert_eq!(t.heading(), 10.0);
    }

    #[test]
    fn test_huge_speed_polygon_uses_capped_default() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        t.set_speed(200_000_000);
        assert_eq!(t.speed(), crate::actor::SPEED_MAX);
        t.n_gon(4, None);
        assert!(near(t.position(), (320.0, 240.0)));
        assert_eq!(t.heading(), 0.0);
    }

    #[test]
    fn test_thickness_clamped() {
        let (canvas, _) = board();
        let t = turtle(&canvas);
        assert_eq!(t.set_thickness(100).value, 20);
        assert_eq!(t.adjust_thickness(-40).value, 1);
        assert_eq!(t.thickness(), 1);
    }

    #[test]
    fn test_two_turtles_later_wins() {
        let (canvas, recorder) = board();
        let a = Turtle::new(&canvas, &ActorSettings::default(), solid(Rgb([0, 255, 0])));
        let b = Turtle::new(
            &canvas,
            &ActorSettings {
                background: "blue".into(),
                ..Default::default()
            },
            solid(Rgb([255, 255, 0])),
        );
        a.pen_up();
        a.move_to(100.0, 100.0);
        b.pen_up();
        b.move_to(102.0, 100.0);

        let frame = canvas.borrow();
        assert_eq!(frame.frame().rgb_at(0, 0), Some(Rgb([0, 0, 255])));
        assert_eq!(frame.frame().rgb_at(98, 100), Some(Rgb([0, 255, 0])));
        assert_eq!(frame.frame().rgb_at(101, 100), Some(Rgb([255, 255, 0])));
        assert_eq!(recorder.frames().last().map(|f| f.actors), Some(2));
    }

    #[test]
    fn test_dropped_turtle_stops_compositing() {
        let (canvas, _) = board();
        let a = turtle(&canvas);
        {
            let _b = turtle(&canvas);
            assert_eq!(canvas.borrow().actor_count(), 2);
        }
        a.refresh();
        assert_eq!(canvas.borrow().actor_count(), 1);
    }

    fn solid(color: Rgb<u8>) -> Raster {
        let mut sprite = Raster::new(5, 5);
        sprite.fill(color);
        sprite
    }
}
