//! Pixelturtle - Turtle graphics on a shared canvas
//!
//! This library provides functionality to:
//! - Drive any number of turtles (actors) over one canvas with a persistent pen layer
//! - Map keyboard events to held-key motion and one-shot drawing actions
//! - Draw procedural patterns (polygons, stars, circles)
//! - Run line-oriented turtle command scripts
//! - Present frames in a terminal

pub mod actor;
pub mod canvas;
pub mod clamp;
pub mod cli;
pub mod clock;
pub mod color;
pub mod compositor;
pub mod config;
pub mod input;
pub mod logging;
pub mod patterns;
pub mod script;
pub mod session;
pub mod shapes;
pub mod sprite;
pub mod surface;
pub mod terminal;
pub mod turtle;
