// Adapters - External system implementations

pub mod ffmpeg;
pub mod mock;

// Re-export adapters
pub use ffmpeg::{FfmpegBackend, FfmpegSettings};
pub use mock::{MockBackend, MockMedia};
