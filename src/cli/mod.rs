//! CLI module for vidpare
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

pub use args::TrimArgs;

/// vidpare video trimmer
///
/// Cuts the time range [start, end) out of a video file into a new file.
/// The input is never modified and a failed run leaves no output behind.
#[derive(Parser, Debug)]
#[command(name = "vidpare")]
#[command(about = "Cut a time range out of a video file")]
#[command(version = concat!("v", env!("CARGO_PKG_VERSION")))]
pub struct Cli {
    #[command(flatten)]
    pub trim: TrimArgs,

    /// Config file (default: ./vidpare.toml when present)
    #[arg(long, env = "VIDPARE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, env = "VIDPARE_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, env = "VIDPARE_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{TimeSpec, TrimEnd};
    use crate::planner::CutPolicy;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["vidpare", "in.mp4", "out.mp4"]).unwrap();
        assert_eq!(cli.trim.input, PathBuf::from("in.mp4"));
        assert_eq!(cli.trim.start, TimeSpec::from_seconds(0.0));
        assert_eq!(cli.trim.end, None);
        assert!(!cli.trim.overwrite);
        assert!(!cli.trim.dry_run);
    }

    #[test]
    fn test_time_arguments() {
        let cli = Cli::try_parse_from([
            "vidpare", "in.mp4", "out.mp4", "--start", "1:30", "--end", "end", "--accuracy", "precise",
        ])
        .unwrap();
        assert_eq!(cli.trim.start.as_seconds(), 90.0);
        assert_eq!(cli.trim.end, Some(TrimEnd::ToEnd));
        assert_eq!(cli.trim.accuracy, Some(CutPolicy::Precise));
    }

    #[test]
    fn test_negative_start_parses_for_validation() {
        let cli = Cli::try_parse_from(["vidpare", "in.mp4", "out.mp4", "--start", "-5"]).unwrap();
        assert_eq!(cli.trim.start.as_seconds(), -5.0);
    }

    #[test]
    fn test_bad_time_rejected() {
        assert!(Cli::try_parse_from(["vidpare", "in.mp4", "out.mp4", "--end", "1:75"]).is_err());
        assert!(Cli::try_parse_from(["vidpare", "in.mp4", "out.mp4", "--start", "soon"]).is_err());
    }

    #[test]
    fn test_output_required() {
        assert!(Cli::try_parse_from(["vidpare", "in.mp4"]).is_err());
    }
}
