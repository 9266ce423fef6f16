//! Core trim engine module
//!
//! [`TrimEngine::trim`] probes the input, validates the range, plans the cut
//! and has the backend write into a staging file that is renamed onto the
//! output path only once extraction succeeded.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::errors::{BackendError, TrimError, ValidationError};
use crate::domain::model::{MediaDuration, MediaProbe, TrimRequest, TrimResult};
use crate::domain::rules::RangeValidator;
use crate::planner::{CutPlanner, ExtractionPlan, PlannerSettings};
use crate::ports::MediaBackend;

mod staging;
pub mod task;

pub use task::spawn_trim;

/// Trim engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub planner: PlannerSettings,
    /// Replace an existing output file
    pub overwrite: bool,
    /// Directory for staging files; defaults to the output's directory
    pub staging_dir: Option<PathBuf>,
}

/// Main trim engine
pub struct TrimEngine {
    backend: Arc<dyn MediaBackend>,
    planner: CutPlanner,
    overwrite: bool,
    staging_dir: Option<PathBuf>,
}

impl TrimEngine {
    /// Create a new engine around an injected backend
    pub fn new(backend: Arc<dyn MediaBackend>, settings: EngineSettings) -> Self {
        Self {
            backend,
            planner: CutPlanner::new(settings.planner),
            overwrite: settings.overwrite,
            staging_dir: settings.staging_dir,
        }
    }

    /// Total duration of the input, which is left untouched
    pub fn probe(&self, input: &Path) -> Result<MediaDuration, TrimError> {
        Ok(self.inspect(input)?.duration)
    }

    fn inspect(&self, input: &Path) -> Result<MediaProbe, TrimError> {
        let metadata = fs::metadata(input).map_err(|e| TrimError::unreadable(input, e))?;
        if !metadata.is_file() {
            return Err(TrimError::unreadable(input, "not a regular file"));
        }

        let probe = self
            .backend
            .probe(input)
            .map_err(|e| TrimError::unreadable(input, error_chain(&e)))?;
        if probe.duration.is_zero() {
            return Err(TrimError::unreadable(input, "media reports a zero duration"));
        }

        debug!(
            input = %input.display(),
            format = probe.format.as_deref().unwrap_or("unknown"),
            video = probe.video.as_ref().map(|v| v.codec_name.as_str()).unwrap_or("none"),
            "Probed duration {}",
            probe.duration
        );
        Ok(probe)
    }

    /// Check the request against a known duration
    pub fn validate(
        &self,
        request: &TrimRequest,
        duration: MediaDuration,
    ) -> Result<(), ValidationError> {
        RangeValidator::validate(request, duration)
    }

    /// Probe, validate and plan without writing anything
    pub fn plan(&self, request: &TrimRequest) -> Result<ExtractionPlan, TrimError> {
        let input = request.input_path();
        let probe = self.inspect(input)?;
        let range = RangeValidator::resolve(request, probe.duration)?;

        let keyframes = if self.planner.needs_keyframes() {
            self.backend
                .keyframes(input)
                .map_err(|e| TrimError::unreadable(input, error_chain(&e)))?
        } else {
            Vec::new()
        };
        if keyframes.is_empty() && self.planner.needs_keyframes() {
            warn!(input = %input.display(), "No keyframe positions found");
        }

        let can_splice = self.backend.can_splice(&probe);
        if !can_splice && self.planner.needs_keyframes() {
            debug!(input = %input.display(), "No matching encoder for a spliced cut");
        }

        Ok(self
            .planner
            .plan(input, range, &keyframes, can_splice)
            .with_source_video(probe.video))
    }

    /// Extract the requested range into the request's output path.
    ///
    /// On error nothing is left at the output path and the staging file is
    /// removed. The input is never modified.
    pub fn trim(&self, request: &TrimRequest) -> Result<TrimResult, TrimError> {
        let started = Instant::now();
        let output = request.output_path();
        info!(
            input = %request.input_path().display(),
            output = %output.display(),
            start = %request.start(),
            end = %request.end(),
            backend = self.backend.name(),
            "Starting trim"
        );

        let plan = self.plan(request)?;
        let must_match = self.check_output(request)?;

        let staging = staging::create(output, request.input_path(), self.staging_dir.as_deref())
            .map_err(|e| extraction_failed(output, BackendError::Io(e)))?;
        debug!(staging = %staging.display(), "Created staging file");

        self.backend
            .extract_range(&plan, &staging)
            .map_err(|e| extraction_failed(output, e))?;

        let written = fs::metadata(&staging)
            .map_err(|e| extraction_failed(output, BackendError::Io(e)))?
            .len();
        if written == 0 {
            return Err(extraction_failed(output, BackendError::EmptyOutput));
        }

        if must_match {
            let same = staging::same_contents(&staging, output)
                .map_err(|e| extraction_failed(output, BackendError::Io(e)))?;
            if !same {
                return Err(TrimError::OutputConflict {
                    path: output.to_path_buf(),
                    reason: "file already exists with different content (enable overwrite to replace it)"
                        .to_string(),
                });
            }
            info!(output = %output.display(), "Output already holds this clip");
        } else {
            staging::commit(staging, output, self.overwrite)?;
        }

        let result = TrimResult {
            output_path: output.to_path_buf(),
            actual_start: MediaDuration::new(plan.actual_start).unwrap_or_default(),
            actual_end: MediaDuration::new(plan.actual_end).unwrap_or_default(),
            strategy: plan.strategy,
        };
        info!(
            output = %output.display(),
            strategy = %result.strategy,
            bytes = written,
            "Trim completed in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    /// Reject outputs that would overwrite the input or a directory.
    ///
    /// Returns true when an existing file must be left alone, so the result
    /// is only accepted if it matches that file byte for byte.
    fn check_output(&self, request: &TrimRequest) -> Result<bool, TrimError> {
        let output = request.output_path();
        let conflict = |reason: &str| TrimError::OutputConflict {
            path: output.to_path_buf(),
            reason: reason.to_string(),
        };

        if output.as_os_str().is_empty() {
            return Err(conflict("output path is empty"));
        }

        let existing = match fs::metadata(output) {
            Ok(metadata) => metadata,
            Err(_) => return Ok(false),
        };

        if let (Ok(a), Ok(b)) = (
            fs::canonicalize(request.input_path()),
            fs::canonicalize(output),
        ) {
            if a == b {
                return Err(conflict("output is the input file"));
            }
        }
        if existing.is_dir() {
            return Err(conflict("output is a directory"));
        }
        Ok(!self.overwrite)
    }
}

fn extraction_failed(output: &Path, cause: BackendError) -> TrimError {
    TrimError::ExtractionFailed {
        path: output.to_path_buf(),
        cause,
    }
}

/// Render an error with its sources, for reasons stored as text
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
