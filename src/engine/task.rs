//! Running trims off the async executor

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::errors::TrimError;
use crate::domain::model::{TrimRequest, TrimResult};
use crate::engine::TrimEngine;

/// Run [`TrimEngine::trim`] on tokio's blocking pool.
///
/// Must be called from within a tokio runtime. Dropping the handle does not
/// stop a trim that already started; it still cleans up its staging file.
pub fn spawn_trim(
    engine: Arc<TrimEngine>,
    request: TrimRequest,
) -> JoinHandle<Result<TrimResult, TrimError>> {
    tokio::task::spawn_blocking(move || engine.trim(&request))
}
