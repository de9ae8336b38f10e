//! End-to-end drawing scenarios through the public library API.
//!
//! Turtles share a canvas whose presenter records every frame, so these tests
//! check both what ends up on the persistent layer and what was presented.

use image::Rgb;
use pixelturtle::actor::ActorSettings;
use pixelturtle::canvas::{Canvas, SharedCanvas, LAYER_KEY};
use pixelturtle::color::{ColorLookup, ColorRegistry};
use pixelturtle::compositor::RecordingPresenter;
use pixelturtle::surface::{Raster, Surface};
use pixelturtle::turtle::Turtle;

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

fn near(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6
}

fn board(width: u32, height: u32) -> (SharedCanvas, RecordingPresenter) {
    let recorder = RecordingPresenter::new();
    let canvas = Canvas::new(width, height).with_presenter(Box::new(recorder.clone())).into_shared();
    (canvas, recorder)
}

fn solid(color: Rgb<u8>) -> Raster {
    let mut sprite = Raster::new(5, 5);
    sprite.fill(color);
    sprite
}

fn unit_speed() -> ActorSettings {
    ActorSettings { speed: 1, ..Default::default() }
}

#[test]
fn test_move_draws_segment_from_center() {
    let (canvas, recorder) = board(640, 480);
    let t = Turtle::new(&canvas, &unit_speed(), Raster::new(3, 3));

    t.forward(10.0);

    assert!(near(t.position(), (320.0, 230.0)));
    let layer = canvas.borrow();
    for y in 231..=239 {
        assert_eq!(layer.layer().rgb_at(320, y), Some(RED), "y = {}", y);
    }
    assert_eq!(layer.layer().rgb_at(320, 225), Some(LAYER_KEY));

    let last = recorder.frames().pop().expect("frame");
    assert_eq!(last.pen_color, "red");
    assert!(near(last.position, (320.0, 230.0)));
}

#[test]
fn test_rotate_then_move() {
    let (canvas, _) = board(640, 480);
    let t = Turtle::new(&canvas, &unit_speed(), Raster::new(3, 3));

    t.rotate(90.0);
    t.forward(10.0);

    assert_eq!(t.heading(), 90.0);
    assert!(near(t.position(), (330.0, 240.0)));
    assert_eq!(canvas.borrow().layer().rgb_at(325, 240), Some(RED));
}

#[test]
fn test_move_and_back_restores_position() {
    let (canvas, _) = board(640, 480);
    let t = Turtle::new(&canvas, &ActorSettings::default(), Raster::new(3, 3));
    t.rotate(37.0);
    let start = t.position();

    t.forward(12.5);
    t.backward(12.5);

    assert!(near(t.position(), start));
    t.rotate(-37.0);
    assert_eq!(t.heading(), 0.0);
}

#[test]
fn test_later_actor_draws_on_top_with_its_background() {
    let (canvas, recorder) = board(200, 200);
    let a = Turtle::new(&canvas, &ActorSettings::default(), solid(Rgb([0, 255, 0])));
    let b = Turtle::new(
        &canvas,
        &ActorSettings { background: "blue".into(), ..Default::default() },
        solid(Rgb([255, 255, 0])),
    );

    // Both at the center: b was registered later
    a.refresh();
    assert_eq!(canvas.borrow().frame().rgb_at(100, 100), Some(Rgb([255, 255, 0])));
    assert_eq!(canvas.borrow().frame().rgb_at(10, 10), Some(Rgb([0, 0, 0])));

    a.pen_up();
    a.move_to(50.0, 50.0);
    b.refresh();

    let canvas = canvas.borrow();
    assert_eq!(canvas.frame().rgb_at(10, 10), Some(BLUE));
    assert_eq!(canvas.frame().rgb_at(50, 50), Some(Rgb([0, 255, 0])));
    assert_eq!(canvas.frame().rgb_at(100, 100), Some(Rgb([255, 255, 0])));
    assert_eq!(recorder.frames().last().map(|f| f.actors), Some(2));
}

#[test]
fn test_square_closes_and_heptagon_does_not() {
    let (canvas, _) = board(640, 480);
    let t = Turtle::new(&canvas, &ActorSettings::default(), Raster::new(3, 3));
    let start = t.position();

    for sides in [4, 6, 8] {
        t.n_gon(sides, Some(10.0));
        assert!(near(t.position(), start), "{} sides", sides);
        assert_eq!(t.heading(), 0.0);
    }

    // 360 / 7 truncates to 51 degrees
    let sides = t.n_gon(7, Some(10.0));
    assert_eq!(sides.value, 7);
    assert_eq!(t.heading(), 357.0);
    assert!(!near(t.position(), start));
}

#[test]
fn test_n_gon_side_count_clamped() {
    let (canvas, _) = board(640, 480);
    let t = Turtle::new(&canvas, &ActorSettings::default(), Raster::new(3, 3));

    let low = t.n_gon(1, Some(5.0));
    assert_eq!((low.value, low.clamped), (3, true));
    let high = t.n_gon(500, Some(1.0));
    assert_eq!((high.value, high.clamped), (72, true));
}

#[test]
fn test_cycle_visits_every_color_once() {
    let (canvas, _) = board(64, 64);
    let t = Turtle::new(&canvas, &ActorSettings::default(), Raster::new(3, 3));
    let count = canvas.borrow().colors().len();

    let start = t.pen_color();
    let mut seen = vec![start.clone()];
    for _ in 1..count {
        seen.push(t.cycle_pen_color());
    }
    assert_eq!(t.cycle_pen_color(), start);

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), count);
}

#[test]
fn test_registered_channels_are_clamped() {
    let (canvas, _) = board(64, 64);
    let t = Turtle::new(&canvas, &ActorSettings::default(), Raster::new(3, 3));

    let stored = t.add_color("this", (300, -5, 128));
    assert!(stored.clamped);
    assert_eq!(stored.value, Rgb([255, 0, 128]));
    assert_eq!(canvas.borrow().colors().rgb("this"), Rgb([255, 0, 128]));

    t.set_pen_color("this");
    t.forward(1.0);
    assert_eq!(canvas.borrow().layer().rgb_at(32, 30), Some(Rgb([255, 0, 128])));
}

#[test]
fn test_unknown_name_falls_back() {
    let colors = ColorRegistry::new();
    assert_eq!(colors.lookup("chartreuse"), ColorLookup::Fallback(Rgb([255, 255, 255])));
    assert_eq!(colors.rgb(""), colors.default_rgb());
}

#[test]
fn test_clear_erases_strokes_from_every_turtle() {
    let (canvas, _) = board(100, 100);
    let a = Turtle::new(&canvas, &unit_speed(), Raster::new(3, 3));
    let b = Turtle::new(&canvas, &unit_speed(), Raster::new(3, 3));
    a.forward(10.0);
    b.right(90.0);
    b.forward(10.0);

    a.clear(Some("blue"));

    let canvas = canvas.borrow();
    assert_eq!(canvas.layer().rgb_at(50, 45), Some(LAYER_KEY));
    assert_eq!(canvas.layer().rgb_at(55, 50), Some(LAYER_KEY));
    assert_eq!(canvas.frame().rgb_at(5, 5), Some(BLUE));
}
