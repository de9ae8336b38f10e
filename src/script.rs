//! Turtle command scripts
//!
//! A script is plain text with one command per line. `#` starts a comment,
//! blank lines are skipped and command names are case-insensitive:
//!
//! ```text
//! # a red square, then a second turtle drawing a star
//! pencolor red
//! ngon 4 10
//! turtle sam
//! aboutface
//! star
//! ```
//!
//! Scripts are parsed in full before anything runs, so a typo on the last
//! line fails without drawing. Execution itself never fails: the same
//! lenient coercions as the interactive primitives apply.

use crate::actor::{ActorSettings, DEFAULT_TURN};
use crate::canvas::SharedCanvas;
use crate::clock::FrameClock;
use crate::input::Notice;
use crate::surface::{Raster, Surface};
use crate::turtle::Turtle;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the turtle commands act on before any `turtle` line.
pub const DEFAULT_TURTLE: &str = "turtle";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{name}'")]
    UnknownCommand { line: usize, name: String },

    #[error("line {line}: '{command}' needs {argument}")]
    MissingArgument {
        line: usize,
        command: String,
        argument: &'static str,
    },

    #[error("line {line}: '{command}': invalid {argument} '{value}'")]
    BadArgument {
        line: usize,
        command: String,
        argument: &'static str,
        value: String,
    },

    #[error("cannot read script '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScriptError {
    /// 1-based source line, when the error came from parsing.
    pub fn line(&self) -> Option<usize> {
        match self {
            ScriptError::UnknownCommand { line, .. }
            | ScriptError::MissingArgument { line, .. }
            | ScriptError::BadArgument { line, .. } => Some(*line),
            ScriptError::Io { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create or select the named turtle
    Turtle(String),
    Forward(f64),
    Backward(f64),
    Left(f64),
    Right(f64),
    Heading(f64),
    AboutFace,
    MoveTo(f64, f64),
    PenUp,
    PenDown,
    TogglePen,
    Show,
    Hide,
    Reset,
    Home,
    Clear(Option<String>),
    PenColor(String),
    Background(String),
    CyclePenColor,
    CycleBackground,
    Thickness(i64),
    Speed(u32),
    AddColor(String, i32, i32, i32),
    NGon(i64, Option<f64>),
    Star(Option<f64>),
    Circle,
    Repeat(u32, f64, f64),
    Wait(u64),
    Help,
}

/// A command and the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub line: usize,
    pub command: Command,
}

pub type Script = Vec<Statement>;

/// Argument cursor for one line.
struct Args<'a> {
    line: usize,
    command: &'a str,
    words: std::slice::Iter<'a, &'a str>,
}

impl<'a> Args<'a> {
    fn next_word(&mut self) -> Option<&'a str> {
        self.words.next().copied()
    }

    fn word(&mut self, argument: &'static str) -> Result<&'a str, ScriptError> {
        self.next_word().ok_or_else(|| ScriptError::MissingArgument {
            line: self.line,
            command: self.command.to_string(),
            argument,
        })
    }

    fn parse<T: std::str::FromStr>(&self, word: &str, argument: &'static str) -> Result<T, ScriptError> {
        word.parse().map_err(|_| ScriptError::BadArgument {
            line: self.line,
            command: self.command.to_string(),
            argument,
            value: word.to_string(),
        })
    }

    fn number<T: std::str::FromStr>(&mut self, argument: &'static str) -> Result<T, ScriptError> {
        let word = self.word(argument)?;
        self.parse(word, argument)
    }

    /// A color channel. Out-of-range integers saturate here and are clamped
    /// into `[0, 255]` when the color is registered.
    fn channel(&mut self, argument: &'static str) -> Result<i32, ScriptError> {
        let value: i64 = self.number(argument)?;
        Ok(value.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    fn optional<T: std::str::FromStr>(&mut self, argument: &'static str) -> Result<Option<T>, ScriptError> {
        match self.next_word() {
            Some(word) => self.parse(word, argument).map(Some),
            None => Ok(None),
        }
    }

    fn finish(mut self) -> Result<(), ScriptError> {
        match self.next_word() {
            Some(extra) => Err(ScriptError::BadArgument {
                line: self.line,
                command: self.command.to_string(),
                argument: "trailing argument",
                value: extra.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Parse one line. Blank and comment-only lines yield `None`.
pub fn parse_line(text: &str, line: usize) -> Result<Option<Statement>, ScriptError> {
    let code = text.split('#').next().unwrap_or_default();
    let words: Vec<&str> = code.split_whitespace().collect();
    let Some((name, rest)) = words.split_first() else {
        return Ok(None);
    };

    let lowered = name.to_ascii_lowercase();
    let mut args = Args {
        line,
        command: name,
        words: rest.iter(),
    };

    let command = match lowered.as_str() {
        "turtle" => Command::Turtle(args.word("a name")?.to_string()),
        "forward" | "fd" | "move" => Command::Forward(args.optional("distance")?.unwrap_or(1.0)),
        "backward" | "back" | "bk" => Command::Backward(args.optional("distance")?.unwrap_or(1.0)),
        "left" | "lt" => Command::Left(args.optional("angle")?.unwrap_or(DEFAULT_TURN)),
        "right" | "rt" => Command::Right(args.optional("angle")?.unwrap_or(DEFAULT_TURN)),
        "heading" | "seth" => Command::Heading(args.number("an angle")?),
        "aboutface" => Command::AboutFace,
        "goto" | "moveto" => {
            let x = args.number("x")?;
            let y = args.number("y")?;
            Command::MoveTo(x, y)
        }
        "penup" | "pu" => Command::PenUp,
        "pendown" | "pd" => Command::PenDown,
        "togglepen" => Command::TogglePen,
        "show" => Command::Show,
        "hide" => Command::Hide,
        "reset" => Command::Reset,
        "home" => Command::Home,
        "clear" => Command::Clear(args.next_word().map(str::to_string)),
        "pencolor" | "color" => Command::PenColor(args.word("a color name")?.to_string()),
        "background" | "bg" => Command::Background(args.word("a color name")?.to_string()),
        "cyclepen" => Command::CyclePenColor,
        "cyclebg" => Command::CycleBackground,
        "thickness" | "penwidth" => Command::Thickness(args.number("a thickness")?),
        "speed" => Command::Speed(args.number("a speed")?),
        "addcolor" => {
            let name = args.word("a color name")?.to_string();
            let r = args.channel("red channel")?;
            let g = args.channel("green channel")?;
            let b = args.channel("blue channel")?;
            Command::AddColor(name, r, g, b)
        }
        "ngon" | "polygon" => {
            let sides = args.number("a side count")?;
            let length = args.optional("side length")?;
            Command::NGon(sides, length)
        }
        "star" => Command::Star(args.optional("side length")?),
        "circle" => Command::Circle,
        "repeat" => {
            let times = args.number("a repeat count")?;
            let angle = args.number("an angle")?;
            let length = args.number("a length")?;
            Command::Repeat(times, angle, length)
        }
        "wait" => Command::Wait(args.number("milliseconds")?),
        "help" => Command::Help,
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                name: name.to_string(),
            })
        }
    };

    args.finish()?;
    Ok(Some(Statement { line, command }))
}

/// Parse a whole script, stopping at the first error.
pub fn parse_script(source: &str) -> Result<Script, ScriptError> {
    let mut script = Vec::new();
    for (index, text) in source.lines().enumerate() {
        if let Some(statement) = parse_line(text, index + 1)? {
            script.push(statement);
        }
    }
    Ok(script)
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> Result<Script, ScriptError> {
    let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_script(&source)
}

/// Source of the built-in two-turtle demo.
///
/// Tom and sam share one canvas, sam facing the other way. For `rounds`
/// rounds both step, turn and cycle their colors; then both switch to a
/// custom color registered with out-of-range channels and draw a star and
/// a circle.
pub fn demo_source(rounds: usize) -> String {
    let mut source = String::from(
        "# tom and sam share one canvas\n\
         turtle tom\n\
         turtle sam\n\
         aboutface\n\
         help\n",
    );
    for _ in 0..rounds {
        source.push_str(
            "turtle tom\nforward 15\nright 25\ncyclepen\ncyclebg\n\
             turtle sam\nforward 15\nright 25\ncyclepen\ncyclebg\n",
        );
    }
    source.push_str(
        "# channels are clamped to 0 255 255\n\
         addcolor this -1 1000 345\n\
         turtle tom\npencolor this\nstar\n\
         turtle sam\npencolor this\nstar\n\
         turtle tom\nngon 72\n\
         turtle sam\nngon 72\n\
         help\n",
    );
    source
}

/// Named turtles sharing one canvas, driven by scripts.
pub struct Stage<S: Surface + Clone = Raster> {
    canvas: SharedCanvas<S>,
    settings: ActorSettings,
    sprite: S,
    turtles: Vec<(String, Turtle<S>)>,
    current: usize,
    clock: FrameClock,
}

impl<S: Surface + Clone> Stage<S> {
    /// New turtles get `settings` and a copy of `sprite`. `clock` paces `wait`.
    pub fn new(canvas: &SharedCanvas<S>, settings: ActorSettings, sprite: S, clock: FrameClock) -> Self {
        Self {
            canvas: canvas.clone(),
            settings,
            sprite,
            turtles: Vec::new(),
            current: 0,
            clock,
        }
    }

    pub fn canvas(&self) -> &SharedCanvas<S> {
        &self.canvas
    }

    /// Turtle names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.turtles.iter().map(|(name, _)| name.as_str())
    }

    pub fn turtle(&self, name: &str) -> Option<&Turtle<S>> {
        self.turtles.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Select `name`, creating it at the canvas center if needed.
    pub fn select(&mut self, name: &str) -> &Turtle<S> {
        match self.turtles.iter().position(|(n, _)| n == name) {
            Some(index) => self.current = index,
            None => {
                tracing::debug!("new turtle '{}'", name);
                let turtle = Turtle::new(&self.canvas, &self.settings, self.sprite.clone());
                self.turtles.push((name.to_string(), turtle));
                self.current = self.turtles.len() - 1;
            }
        }
        &self.turtles[self.current].1
    }

    /// The selected turtle, creating [`DEFAULT_TURTLE`] if there is none yet.
    pub fn current(&mut self) -> &Turtle<S> {
        if self.turtles.is_empty() {
            return self.select(DEFAULT_TURTLE);
        }
        &self.turtles[self.current].1
    }

    /// Run every statement in order.
    pub fn execute(&mut self, script: &[Statement]) {
        for statement in script {
            tracing::trace!("line {}: {:?}", statement.line, statement.command);
            self.apply(&statement.command);
        }
    }

    /// Parse and run `source`.
    pub fn run_source(&mut self, source: &str) -> Result<(), ScriptError> {
        let script = parse_script(source)?;
        self.execute(&script);
        Ok(())
    }

    fn apply(&mut self, command: &Command) {
        match command {
            Command::Turtle(name) => {
                self.select(name);
            }
            Command::Wait(ms) => self.clock.wait(Duration::from_millis(*ms)),
            Command::Help => self.canvas.borrow_mut().presenter_mut().notify(&Notice::Help),
            other => {
                let turtle = self.current();
                apply_to_turtle(turtle, other);
            }
        }
    }
}

fn apply_to_turtle<S: Surface>(turtle: &Turtle<S>, command: &Command) {
    match command {
        Command::Forward(units) => turtle.forward(*units),
        Command::Backward(units) => turtle.backward(*units),
        Command::Left(degrees) => turtle.left(*degrees),
        Command::Right(degrees) => turtle.right(*degrees),
        Command::Heading(heading) => turtle.set_heading(*heading),
        Command::AboutFace => turtle.about_face(),
        Command::MoveTo(x, y) => turtle.move_to(*x, *y),
        Command::PenUp => turtle.pen_up(),
        Command::PenDown => turtle.pen_down(),
        Command::TogglePen => {
            turtle.toggle_pen();
        }
        Command::Show => turtle.show(),
        Command::Hide => turtle.hide(),
        Command::Reset => turtle.reset(),
        Command::Home => turtle.home(),
        Command::Clear(color) => turtle.clear(color.as_deref()),
        Command::PenColor(color) => turtle.set_pen_color(color),
        Command::Background(color) => turtle.set_background_color(color),
        Command::CyclePenColor => {
            turtle.cycle_pen_color();
        }
        Command::CycleBackground => {
            turtle.cycle_background_color();
        }
        Command::Thickness(thickness) => {
            turtle.set_thickness(*thickness);
        }
        Command::Speed(speed) => turtle.set_speed(*speed),
        Command::AddColor(name, r, g, b) => {
            turtle.add_color(name, (*r, *g, *b));
        }
        Command::NGon(sides, length) => {
            turtle.n_gon(*sides, *length);
        }
        Command::Star(length) => turtle.star(*length),
        Command::Circle => turtle.circle(),
        Command::Repeat(times, angle, length) => turtle.repeat(*times, *angle, *length),
        Command::Turtle(_) | Command::Wait(_) | Command::Help => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::compositor::RecordingPresenter;
    use image::Rgb;

    fn stage() -> (Stage, RecordingPresenter) {
        let recorder = RecordingPresenter::new();
        let canvas = Canvas::new(640, 480).with_presenter(Box::new(recorder.clone())).into_shared();
        let stage = Stage::new(&canvas, ActorSettings::default(), Raster::new(3, 3), FrameClock::unpaced());
        (stage, recorder)
    }

    fn command(text: &str) -> Command {
        match parse_line(text, 1) {
            Ok(Some(statement)) => statement.command,
            other => panic!("'{}' did not parse: {:?}", text, other),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(command("forward 10"), Command::Forward(10.0));
        assert_eq!(command("FD 2.5"), Command::Forward(2.5));
        assert_eq!(command("forward"), Command::Forward(1.0));
        assert_eq!(command("left"), Command::Left(DEFAULT_TURN));
        assert_eq!(command("rt 90"), Command::Right(90.0));
        assert_eq!(command("goto 1 2"), Command::MoveTo(1.0, 2.0));
        assert_eq!(command("clear"), Command::Clear(None));
        assert_eq!(command("clear blue"), Command::Clear(Some("blue".into())));
        assert_eq!(command("addcolor this -1 1000 345"), Command::AddColor("this".into(), -1, 1000, 345));
        assert_eq!(command("ngon 7"), Command::NGon(7, None));
        assert_eq!(command("ngon 4 12"), Command::NGon(4, Some(12.0)));
        assert_eq!(command("repeat 3 120 10"), Command::Repeat(3, 120.0, 10.0));
        assert_eq!(command("  pencolor Red  # comment"), Command::PenColor("Red".into()));
    }

    #[test]
    fn test_addcolor_saturates_wide_channels() {
        assert_eq!(
            command("addcolor x 99999999999 0 -99999999999"),
            Command::AddColor("x".into(), i32::MAX, 0, i32::MIN)
        );
        assert!(matches!(parse_line("addcolor x 1e3 0 0", 1), Err(ScriptError::BadArgument { .. })));

        let (mut stage, _) = stage();
        stage.run_source("addcolor x 99999999999 0 0").expect("script");
        assert_eq!(stage.canvas().borrow().colors().rgb("x"), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("", 1).ok(), Some(None));
        assert_eq!(parse_line("   # just a note", 1).ok(), Some(None));
    }

    #[test]
    fn test_unknown_command_reports_line() {
        let err = parse_script("forward 1\n\njump 3\n").err();
        assert!(matches!(err, Some(ScriptError::UnknownCommand { line: 3, ref name }) if name == "jump"));
        assert_eq!(err.map(|e| e.to_string()), Some("line 3: unknown command 'jump'".to_string()));
    }

    #[test]
    fn test_missing_and_bad_arguments() {
        assert!(matches!(parse_line("goto 5", 4), Err(ScriptError::MissingArgument { line: 4, argument: "y", .. })));
        assert!(matches!(parse_line("speed fast", 2), Err(ScriptError::BadArgument { line: 2, .. })));
        assert!(matches!(parse_line("speed -1", 2), Err(ScriptError::BadArgument { .. })));
        assert!(matches!(parse_line("penup now", 9), Err(ScriptError::BadArgument { line: 9, .. })));
        assert!(matches!(parse_line("turtle", 1), Err(ScriptError::MissingArgument { .. })));
    }

    #[test]
    fn test_commands_apply_to_default_turtle() {
        let (mut stage, _) = stage();
        stage.run_source("speed 1\nforward 10\nright 90").expect("script");
        let turtle = stage.current();
        assert_eq!(turtle.heading(), 90.0);
        assert!((turtle.position().1 - 230.0).abs() < 1e-9);
        assert_eq!(stage.names().collect::<Vec<_>>(), vec![DEFAULT_TURTLE]);
    }

    #[test]
    fn test_turtle_selects_and_creates() {
        let (mut stage, _) = stage();
        stage.run_source("turtle tom\nturtle sam\naboutface\nturtle tom\nright 10").expect("script");
        assert_eq!(stage.names().collect::<Vec<_>>(), vec!["tom", "sam"]);
        assert_eq!(stage.turtle("tom").map(|t| t.heading()), Some(10.0));
        assert_eq!(stage.turtle("sam").map(|t| t.heading()), Some(180.0));
        assert_eq!(stage.canvas().borrow().actor_count(), 2);
    }

    #[test]
    fn test_parse_error_runs_nothing() {
        let (mut stage, recorder) = stage();
        assert!(stage.run_source("forward 3\nbogus").is_err());
        assert_eq!(recorder.frame_count(), 0);
    }

    #[test]
    fn test_help_is_a_notice() {
        let (mut stage, recorder) = stage();
        stage.run_source("help").expect("script");
        assert_eq!(recorder.notices(), vec![Notice::Help]);
    }

    #[test]
    fn test_demo_source_parses_and_runs() {
        let (mut stage, recorder) = stage();
        let source = demo_source(9);
        stage.run_source(&source).expect("demo");

        assert_eq!(stage.names().collect::<Vec<_>>(), vec!["tom", "sam"]);
        assert_eq!(stage.canvas().borrow().colors().rgb("this"), image::Rgb([0, 255, 255]));
        assert_eq!(stage.turtle("tom").map(|t| t.pen_color()), Some("this".to_string()));
        assert_eq!(recorder.notices().len(), 2);
        assert!(recorder.frame_count() > 100);
    }
}
