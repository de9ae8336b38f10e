//! Keyboard input driving a turtle through the session loop.
//!
//! Events are replayed from prepared batches and the clock is unpaced, so a
//! whole interactive session runs instantly and deterministically.

use pixelturtle::actor::ActorSettings;
use pixelturtle::canvas::{Canvas, SharedCanvas};
use pixelturtle::clock::FrameClock;
use pixelturtle::compositor::RecordingPresenter;
use pixelturtle::input::{InputEvent, InputMapper, Intent, Key, Notice, ScriptedEvents};
use pixelturtle::session::{Session, SessionSummary};
use pixelturtle::surface::{Raster, Surface};
use pixelturtle::turtle::Turtle;

fn setup() -> (SharedCanvas, RecordingPresenter, Turtle) {
    let recorder = RecordingPresenter::new();
    let canvas = Canvas::new(640, 480).with_presenter(Box::new(recorder.clone())).into_shared();
    let turtle = Turtle::new(&canvas, &ActorSettings { speed: 1, ..Default::default() }, Raster::new(3, 3));
    (canvas, recorder, turtle)
}

fn down(key: Key) -> InputEvent {
    InputEvent::KeyDown(key)
}

fn up(key: Key) -> InputEvent {
    InputEvent::KeyUp(key)
}

fn run(turtle: &Turtle, batches: Vec<Vec<InputEvent>>) -> SessionSummary {
    Session::new(turtle, ScriptedEvents::new(batches), InputMapper::new(5.0), FrameClock::unpaced())
        .run()
        .expect("scripted session")
}

#[test]
fn test_held_turn_applies_every_tick() {
    let (_, _, t) = setup();
    run(&t, vec![vec![down(Key::Left)], vec![], vec![up(Key::Left)], vec![]]);
    assert_eq!(t.heading(), 350.0);
}

#[test]
fn test_turn_is_applied_before_motion() {
    let (_, _, t) = setup();
    run(&t, vec![vec![down(Key::Up), down(Key::Right)], vec![up(Key::Up), up(Key::Right)]]);

    assert_eq!(t.heading(), 5.0);
    let (x, y) = t.position();
    assert!(x > 320.0, "moved along the new heading, x = {}", x);
    assert!(y < 240.0);
}

#[test]
fn test_one_shot_fires_once_per_press() {
    let (_, _, t) = setup();
    run(&t, vec![vec![down(Key::Char('.'))], vec![], vec![], vec![down(Key::Char('.'))]]);
    assert_eq!(t.heading(), 180.0);
}

#[test]
fn test_one_shot_actions() {
    let (_, _, t) = setup();
    run(
        &t,
        vec![
            vec![down(Key::Down)],
            vec![down(Key::Char('z')), down(Key::Char('a'))],
            vec![down(Key::Char('=')), down(Key::Char('='))],
            vec![down(Key::Char(','))],
        ],
    );
    assert!(!t.is_pen_down());
    assert_eq!(t.pen_color(), "white");
    assert_eq!(t.background(), "blue");
    assert_eq!(t.thickness(), 5);
    assert_eq!(t.heading(), 270.0);

    run(&t, vec![vec![down(Key::Space), down(Key::Char('0'))]]);
    assert_eq!(t.heading(), 0.0);
    assert_eq!(t.position(), (320.0, 240.0));
}

#[test]
fn test_polygon_key_returns_home() {
    let (_, _, t) = setup();
    run(&t, vec![vec![down(Key::Char('4'))], vec![down(Key::Char('6'))]]);
    let (x, y) = t.position();
    assert!((x - 320.0).abs() < 1e-6 && (y - 240.0).abs() < 1e-6);
    assert_eq!(t.heading(), 0.0);
}

#[test]
fn test_unused_key_is_reported_not_fatal() {
    let (_, recorder, t) = setup();
    let summary = run(&t, vec![vec![down(Key::Char('q'))], vec![down(Key::Char('h'))], vec![]]);

    assert_eq!(summary.ticks, 3);
    assert_eq!(
        recorder.notices(),
        vec![Notice::UnusedKey(Key::Char('q')), Notice::Help]
    );
}

#[test]
fn test_quit_only_on_close_or_escape() {
    let (_, _, t) = setup();
    let mut mapper = InputMapper::default();

    let mut keys = vec![
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Space,
        Key::Backspace,
        Key::Other("F1".into()),
    ];
    keys.extend("azc,.0-=+3456789shq?x".chars().map(Key::Char));
    for key in keys {
        let batch = [down(key.clone()), up(key.clone())];
        assert_eq!(mapper.process(&batch, &t), Intent::Continue, "{}", key);
    }

    assert_eq!(mapper.process(&[InputEvent::Close], &t), Intent::Quit);
    assert_eq!(mapper.process(&[down(Key::Escape)], &t), Intent::Quit);
    assert_eq!(mapper.process(&[up(Key::Escape)], &t), Intent::Continue);
}

#[test]
fn test_quit_outranks_pause_in_one_batch() {
    let (_, _, t) = setup();
    let summary = run(&t, vec![vec![down(Key::Char('p')), down(Key::Escape)], vec![down(Key::Up)]]);
    assert_eq!(summary.ticks, 0);
    assert_eq!(t.position(), (320.0, 240.0));
}

#[test]
fn test_every_tick_renders_while_holding() {
    let (_, recorder, t) = setup();
    let before = recorder.frame_count();
    run(&t, vec![vec![down(Key::Up)], vec![], vec![up(Key::Up)]]);
    assert_eq!(recorder.frame_count() - before, 2);
}
