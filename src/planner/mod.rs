//! Cut strategy planning module
//!
//! Encodings can only be cut without re-encoding at keyframes. The
//! [`CutPolicy`] makes the speed vs. frame-accuracy trade-off explicit:
//!
//! - `keyframe`: stream copy only, the start snaps back to the previous
//!   keyframe (fast, lossless, may include extra leading material)
//! - `precise`: re-encode the whole range (slow, frame-exact)
//! - `smart`: re-encode only the leading segment up to the first keyframe
//!   inside the range and stream copy the rest (frame-exact, mostly lossless).
//!   Needs an encoder matching the source codec; otherwise an unaligned
//!   range is re-encoded whole.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::model::VideoStream;

pub mod strategy;

pub use strategy::CutPlanner;

/// Accuracy policy for cut boundaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CutPolicy {
    /// Stream copy from the nearest preceding keyframe
    Keyframe,
    /// Re-encode the whole range
    Precise,
    /// Re-encode the leading boundary segment only
    #[default]
    Smart,
}

/// Strategy chosen for a concrete plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// Lossless stream copy (fast)
    Copy,
    /// Full re-encoding (slow, exact)
    Reencode,
    /// Re-encoded leading segment followed by a stream-copied body
    BoundaryReencode,
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExtractionStrategy::Copy => "copy",
            ExtractionStrategy::Reencode => "reencode",
            ExtractionStrategy::BoundaryReencode => "boundary-reencode",
        };
        f.write_str(name)
    }
}

/// How one segment is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentMode {
    Copy,
    Reencode,
}

/// A contiguous piece of the output, in source time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub mode: SegmentMode,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Cut plan information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionPlan {
    /// Input file path
    pub input: PathBuf,
    /// Ordered, contiguous segments covering `[actual_start, actual_end)`
    pub segments: Vec<Segment>,
    pub actual_start: f64,
    pub actual_end: f64,
    pub strategy: ExtractionStrategy,
    /// Source video coding, used to match the encoder of spliced segments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoStream>,
}

impl ExtractionPlan {
    pub fn with_source_video(mut self, video: Option<VideoStream>) -> Self {
        self.video = video;
        self
    }

    /// Whether re-encoded and stream-copied segments get joined
    pub fn is_spliced(&self) -> bool {
        self.segments.len() > 1
    }

    /// Output duration the plan produces
    pub fn duration(&self) -> f64 {
        self.actual_end - self.actual_start
    }

    pub fn reencoded_duration(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.mode == SegmentMode::Reencode)
            .map(Segment::duration)
            .sum()
    }
}

/// Planner tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerSettings {
    pub policy: CutPolicy,
    /// Distance within which a cut counts as on a keyframe (seconds)
    pub keyframe_tolerance: f64,
    /// Shortest stream-copied body worth a boundary split (seconds)
    pub min_copy_duration: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            policy: CutPolicy::Smart,
            keyframe_tolerance: 0.001,
            min_copy_duration: 2.0,
        }
    }
}
