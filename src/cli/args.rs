//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{TimeSpec, TrimEnd};
use crate::planner::CutPolicy;

/// Arguments for a trim
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Output file path
    pub output: PathBuf,

    /// Start time (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub start: TimeSpec,

    /// End time, or "end" for the end of the media [default: end]
    #[arg(short, long, allow_hyphen_values = true)]
    pub end: Option<TrimEnd>,

    /// Cut accuracy policy
    #[arg(short, long, value_enum, env = "VIDPARE_ACCURACY")]
    pub accuracy: Option<CutPolicy>,

    /// Replace the output file if it exists
    #[arg(long)]
    pub overwrite: bool,

    /// Print the extraction plan without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}
