// Domain errors - Error types for the domain layer

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::{MediaDuration, TimeSpec};

/// Process exit codes, one per error class
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    pub const USAGE: u8 = 2;
    pub const RESOURCE_UNREADABLE: u8 = 3;
    pub const EXTRACTION_FAILED: u8 = 4;
    pub const OUTPUT_CONFLICT: u8 = 5;
}

/// A time string that could not be understood
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeParseError {
    #[error("time value is empty")]
    Empty,

    #[error("invalid time format: {input}. Expected seconds (90.5), MM:SS.ms (1:30.5) or HH:MM:SS.ms (0:01:30.5)")]
    Invalid { input: String },

    #[error("invalid time {input}: {component} must be less than 60")]
    ComponentOutOfRange {
        input: String,
        component: &'static str,
    },
}

/// A trim range rejected against the media duration.
///
/// Checks run in declaration order and the first violation wins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("start time {start} is negative")]
    NegativeStart { start: TimeSpec },

    #[error("end time {end} must be after start time {start}")]
    EndBeforeStart { start: TimeSpec, end: TimeSpec },

    #[error("end time {end} is beyond the media duration {duration}")]
    EndBeyondDuration { end: TimeSpec, duration: MediaDuration },
}

/// Failure reported by a media backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to launch {tool}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("could not parse {tool} output: {message}")]
    Parse { tool: String, message: String },

    #[error("{message}")]
    Unsupported { message: String },

    #[error("backend produced an empty output file")]
    EmptyOutput,

    #[error("I/O error")]
    Io(#[from] io::Error),
}

/// Main error type for trim operations
#[derive(Error, Debug)]
pub enum TrimError {
    /// Input missing, not a file, or not decodable media
    #[error("cannot read media resource {}: {reason}", path.display())]
    ResourceUnreadable { path: PathBuf, reason: String },

    /// The requested range does not fit the media
    #[error("invalid trim range: {0}")]
    Validation(#[from] ValidationError),

    /// The output path cannot be written without clobbering something
    #[error("refusing to write {}: {reason}", path.display())]
    OutputConflict { path: PathBuf, reason: String },

    /// Extraction or commit failed; nothing was left at the output path
    #[error("failed to extract into {}", path.display())]
    ExtractionFailed {
        path: PathBuf,
        #[source]
        cause: BackendError,
    },
}

impl TrimError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TrimError::ResourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Exit code the CLI reports for this error class
    pub fn exit_code(&self) -> u8 {
        match self {
            TrimError::ResourceUnreadable { .. } => exit_codes::RESOURCE_UNREADABLE,
            TrimError::Validation(_) => exit_codes::USAGE,
            TrimError::ExtractionFailed { .. } => exit_codes::EXTRACTION_FAILED,
            TrimError::OutputConflict { .. } => exit_codes::OUTPUT_CONFLICT,
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Only extraction failures depend on the environment (disk space,
    /// permissions); the engine itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, TrimError::ExtractionFailed { .. })
    }
}
