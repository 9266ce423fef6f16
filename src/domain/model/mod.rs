// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::TimeParseError;
use crate::planner::ExtractionStrategy;
use crate::utils::time;

/// Time specification with precision - signed seconds as given by the user.
///
/// A negative value is representable so that range validation, not parsing,
/// decides how to report it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, TimeParseError> {
        let trimmed = time_str.trim();
        if trimmed.is_empty() {
            return Err(TimeParseError::Empty);
        }
        let invalid = || TimeParseError::Invalid {
            input: trimmed.to_string(),
        };

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let parts: Vec<&str> = body.split(':').collect();
        let seconds = match parts.as_slice() {
            [secs] => parse_decimal(secs).ok_or_else(invalid)?,
            [minutes, secs] => {
                let minutes = parse_whole(minutes).ok_or_else(invalid)?;
                let secs = parse_decimal(secs).ok_or_else(invalid)?;
                check_below_sixty(trimmed, "seconds", secs)?;
                minutes * 60.0 + secs
            }
            [hours, minutes, secs] => {
                let hours = parse_whole(hours).ok_or_else(invalid)?;
                let minutes = parse_whole(minutes).ok_or_else(invalid)?;
                let secs = parse_decimal(secs).ok_or_else(invalid)?;
                check_below_sixty(trimmed, "minutes", minutes)?;
                check_below_sixty(trimmed, "seconds", secs)?;
                hours * 3600.0 + minutes * 60.0 + secs
            }
            _ => return Err(invalid()),
        };

        if !seconds.is_finite() {
            return Err(invalid());
        }
        Ok(Self::from_seconds(if negative { -seconds } else { seconds }))
    }
}

/// Digits with at most one decimal point, e.g. `12`, `12.5`, `.5`
fn parse_decimal(s: &str) -> Option<f64> {
    let valid = !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().filter(|&c| c == '.').count() <= 1
        && s.chars().any(|c| c.is_ascii_digit());
    if valid {
        s.parse().ok()
    } else {
        None
    }
}

fn parse_whole(s: &str) -> Option<f64> {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse::<u64>().ok().map(|v| v as f64)
    } else {
        None
    }
}

fn check_below_sixty(input: &str, component: &'static str, value: f64) -> Result<(), TimeParseError> {
    if value >= 60.0 {
        return Err(TimeParseError::ComponentOutOfRange {
            input: input.to_string(),
            component,
        });
    }
    Ok(())
}

impl FromStr for TimeSpec {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds < 0.0 {
            write!(f, "-{}", time::precise(-self.seconds))
        } else {
            write!(f, "{}", time::precise(self.seconds))
        }
    }
}

/// End of a trim range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrimEnd {
    /// An explicit end time
    At(TimeSpec),
    /// Run to the end of the media, clamped to its duration
    ToEnd,
}

impl TrimEnd {
    /// Parse an end time; `end` means the end of the media
    pub fn parse(end_str: &str) -> Result<Self, TimeParseError> {
        if end_str.trim().eq_ignore_ascii_case("end") {
            return Ok(TrimEnd::ToEnd);
        }
        TimeSpec::parse(end_str).map(TrimEnd::At)
    }

    /// End time in seconds once the media duration is known
    pub fn resolve(&self, duration: MediaDuration) -> f64 {
        match self {
            TrimEnd::At(time) => time.seconds,
            TrimEnd::ToEnd => duration.as_seconds(),
        }
    }
}

impl FromStr for TrimEnd {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TrimEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimEnd::At(time) => write!(f, "{}", time),
            TrimEnd::ToEnd => write!(f, "end"),
        }
    }
}

/// Non-negative, finite length of time in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MediaDuration(f64);

impl MediaDuration {
    /// Returns `None` for negative or non-finite values
    pub fn new(seconds: f64) -> Option<Self> {
        if seconds.is_finite() && seconds >= 0.0 {
            Some(Self(seconds))
        } else {
            None
        }
    }

    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for MediaDuration {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        MediaDuration::new(value).ok_or_else(|| format!("invalid duration: {}", value))
    }
}

impl From<MediaDuration> for f64 {
    fn from(duration: MediaDuration) -> f64 {
        duration.0
    }
}

impl fmt::Display for MediaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", time::precise(self.0))
    }
}

/// Coding parameters of the primary video stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStream {
    pub codec_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_fmt: Option<String>,
}

impl VideoStream {
    pub fn new(codec_name: impl Into<String>) -> Self {
        Self {
            codec_name: codec_name.into(),
            profile: None,
            pix_fmt: None,
        }
    }
}

/// What a backend learned about a media resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaProbe {
    pub duration: MediaDuration,
    /// Container format name as reported by the backend
    pub format: Option<String>,
    /// First video stream, if any
    pub video: Option<VideoStream>,
}

/// A request to cut `[start, end)` out of `input_path` into `output_path`.
///
/// Immutable once built; validation happens against the probed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRequest {
    input_path: PathBuf,
    output_path: PathBuf,
    start: TimeSpec,
    end: TrimEnd,
}

impl TrimRequest {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        start: TimeSpec,
        end: TrimEnd,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            start,
            end,
        }
    }

    /// Request an explicit `[start, end)` range in seconds
    pub fn with_range(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        start: f64,
        end: f64,
    ) -> Self {
        Self::new(
            input_path,
            output_path,
            TimeSpec::from_seconds(start),
            TrimEnd::At(TimeSpec::from_seconds(end)),
        )
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn start(&self) -> TimeSpec {
        self.start
    }

    pub fn end(&self) -> TrimEnd {
        self.end
    }
}

/// A range that passed validation: `0 <= start < end <= duration`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidatedRange {
    pub start: f64,
    pub end: f64,
}

impl ValidatedRange {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// The committed output of a successful trim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimResult {
    pub output_path: PathBuf,
    /// Start actually written; earlier than requested under keyframe snapping
    pub actual_start: MediaDuration,
    pub actual_end: MediaDuration,
    pub strategy: ExtractionStrategy,
}

impl TrimResult {
    pub fn duration(&self) -> f64 {
        self.actual_end.as_seconds() - self.actual_start.as_seconds()
    }
}

#[cfg(test)]
mod tests;
