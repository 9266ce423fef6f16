// Ports - Interface definitions (contracts)

use std::path::Path;

use crate::domain::errors::BackendError;
use crate::domain::model::MediaProbe;
use crate::planner::ExtractionPlan;

/// Port for the media decode/encode capability the engine drives.
///
/// Implementations are blocking and must not keep state between calls that
/// would make concurrent use with distinct staging paths unsafe.
pub trait MediaBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Inspect the resource without mutating it
    fn probe(&self, input: &Path) -> Result<MediaProbe, BackendError>;

    /// Keyframe times of the primary video stream, in seconds.
    ///
    /// An empty list means the positions are unknown.
    fn keyframes(&self, input: &Path) -> Result<Vec<f64>, BackendError>;

    /// Whether a re-encoded lead can be joined to a stream-copied body of
    /// this media without mixing video codecs
    fn can_splice(&self, probe: &MediaProbe) -> bool;

    /// Write the planned range to `staging`, a file path the engine owns.
    ///
    /// Intermediate files must not outlive the call.
    fn extract_range(&self, plan: &ExtractionPlan, staging: &Path) -> Result<(), BackendError>;
}
