//! pxt - Turtle graphics in the terminal

use std::process::ExitCode;

use pixelturtle::cli;

fn main() -> ExitCode {
    cli::run()
}
