//! vidpare command-line video trimmer
//!
//! ```bash
//! vidpare input.mp4 clip.mp4 --start 1:00 --end 1:30
//! vidpare input.mp4 tail.mp4 --start 90 --accuracy keyframe
//! vidpare input.mp4 clip.mp4 --start 2 --end 7 --dry-run --json
//! ```

use std::process::ExitCode;

use clap::Parser;

use vidpare::cli::{commands, Cli};
use vidpare::domain::errors::exit_codes;
use vidpare::TrimError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match commands::run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Map an error to the process exit code of its class
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<TrimError>()
        .map(TrimError::exit_code)
        .unwrap_or(exit_codes::FAILURE)
}
