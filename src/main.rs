//! pxc - command-line editor for 64x64 palette pixel art

use std::process::ExitCode;

use pixel_canvas::cli;

fn main() -> ExitCode {
    cli::run()
}
