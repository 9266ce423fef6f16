//! Manifest-backed media backend
//!
//! A "media file" here is a small JSON manifest describing its duration and
//! keyframes. Extraction writes a manifest for the trimmed range, which makes
//! the engine testable end to end without FFmpeg.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::errors::BackendError;
use crate::domain::model::{MediaDuration, MediaProbe, VideoStream};
use crate::planner::{ExtractionPlan, Segment, SegmentMode};
use crate::ports::MediaBackend;

const TOOL: &str = "mock";

/// Contents of a manifest file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockMedia {
    pub duration: f64,
    #[serde(default)]
    pub keyframes: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    /// Source segments an extracted manifest was built from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<Segment>,
}

impl MockMedia {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            keyframes: Vec::new(),
            format: Some("mock".to_string()),
            video_codec: Some("h264".to_string()),
            segments: Vec::new(),
        }
    }

    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    /// Keyframes every `interval` seconds starting at zero
    pub fn with_keyframe_interval(mut self, interval: f64) -> Self {
        self.keyframes.clear();
        if interval > 0.0 {
            let mut index = 0u32;
            loop {
                let t = f64::from(index) * interval;
                if t >= self.duration {
                    break;
                }
                self.keyframes.push(t);
                index += 1;
            }
        }
        self
    }

    pub fn with_keyframes(mut self, keyframes: Vec<f64>) -> Self {
        self.keyframes = keyframes;
        self
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    pub fn read_from(path: &Path) -> Result<Self, BackendError> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Parse {
            tool: TOOL.to_string(),
            message: e.to_string(),
        })
    }

    /// Manifest for the output of `plan`, in output time
    fn extracted(&self, plan: &ExtractionPlan) -> Self {
        let offset = plan.actual_start;
        let mut keyframes = Vec::new();
        for segment in &plan.segments {
            keyframes.push(segment.start - offset);
            if segment.mode == SegmentMode::Copy {
                keyframes.extend(
                    self.keyframes
                        .iter()
                        .filter(|&&k| k > segment.start && k < segment.end)
                        .map(|k| k - offset),
                );
            }
        }
        keyframes.sort_by(f64::total_cmp);
        keyframes.dedup();

        Self {
            duration: plan.duration(),
            keyframes,
            format: self.format.clone(),
            video_codec: self.video_codec.clone(),
            segments: plan.segments.clone(),
        }
    }
}

/// Backend operating on [`MockMedia`] manifests
#[derive(Debug, Default)]
pub struct MockBackend {
    failure: Option<io::ErrorKind>,
    /// Video codecs this backend cannot encode
    missing_encoders: Vec<String>,
    extractions: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose extractions write partial output, then fail
    pub fn failing_with(kind: io::ErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::default()
        }
    }

    /// Backend lacking an encoder for `codec`
    pub fn without_encoder(mut self, codec: impl Into<String>) -> Self {
        self.missing_encoders.push(codec.into());
        self
    }

    fn has_encoder(&self, codec: &str) -> bool {
        !self.missing_encoders.iter().any(|c| c == codec)
    }

    /// Number of `extract_range` calls so far
    pub fn extraction_count(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }
}

impl MediaBackend for MockBackend {
    fn name(&self) -> &'static str {
        TOOL
    }

    fn probe(&self, input: &Path) -> Result<MediaProbe, BackendError> {
        let media = MockMedia::read_from(input)?;
        let duration = MediaDuration::new(media.duration).ok_or_else(|| BackendError::Parse {
            tool: TOOL.to_string(),
            message: format!("invalid duration {}", media.duration),
        })?;
        Ok(MediaProbe {
            duration,
            format: media.format,
            video: media.video_codec.map(VideoStream::new),
        })
    }

    fn keyframes(&self, input: &Path) -> Result<Vec<f64>, BackendError> {
        Ok(MockMedia::read_from(input)?.keyframes)
    }

    fn can_splice(&self, probe: &MediaProbe) -> bool {
        probe
            .video
            .as_ref()
            .map_or(true, |v| self.has_encoder(&v.codec_name))
    }

    fn extract_range(&self, plan: &ExtractionPlan, staging: &Path) -> Result<(), BackendError> {
        self.extractions.fetch_add(1, Ordering::SeqCst);

        if let Some(kind) = self.failure {
            fs::write(staging, b"partial")?;
            return Err(BackendError::Io(io::Error::new(
                kind,
                "simulated extraction failure",
            )));
        }

        if plan.is_spliced() {
            if let Some(video) = plan.video.as_ref().filter(|v| !self.has_encoder(&v.codec_name)) {
                return Err(BackendError::Unsupported {
                    message: format!("no encoder matches source codec {}", video.codec_name),
                });
            }
        }

        let source = MockMedia::read_from(&plan.input)?;
        source.extracted(plan).write_to(staging)?;
        Ok(())
    }
}
