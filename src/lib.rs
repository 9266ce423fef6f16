//! vidpare trim engine
//!
//! Extracts a contiguous time range of a video file into a new file. The
//! input is never modified, invalid ranges are rejected before any output is
//! written, and a failed extraction leaves nothing at the output path.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vidpare::adapters::FfmpegBackend;
//! use vidpare::{EngineSettings, TrimEngine, TrimRequest};
//!
//! let engine = TrimEngine::new(Arc::new(FfmpegBackend::default()), EngineSettings::default());
//! let result = engine.trim(&TrimRequest::with_range("in.mp4", "out.mp4", 2.0, 7.0))?;
//! println!("wrote {}", result.output_path.display());
//! # Ok::<(), vidpare::TrimError>(())
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{BackendError, TimeParseError, TrimError, ValidationError};
pub use domain::model::{MediaDuration, TimeSpec, TrimEnd, TrimRequest, TrimResult};
pub use engine::{spawn_trim, EngineSettings, TrimEngine};
pub use planner::{CutPolicy, ExtractionPlan, ExtractionStrategy};
pub use ports::MediaBackend;

/// Crate version, as reported by `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
