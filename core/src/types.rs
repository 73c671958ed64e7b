use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::transform::TransformError;

/// Unified engine error covering validation, dispatch, and transform failures.
/// - Every variant is fatal for the call that produced it; there is no
///   partial-success result.
/// - `From<T>` impls keep `?` ergonomic across layers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller supplied parameters outside the accepted range.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// The pool did not drain every submitted chunk before the deadline.
    #[error("timed out after {deadline:?}: {completed}/{total} chunks completed")]
    Timeout {
        deadline: Duration,
        completed: usize,
        total: usize,
    },

    /// The transform rejected a chunk; the whole call is aborted.
    #[error("transform failed on chunk {chunk_index}: {source}")]
    Transform {
        chunk_index: usize,
        #[source]
        source: TransformError,
    },

    /// A transform panicked inside a worker or task.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),

    /// A pool channel closed while chunks were still outstanding.
    #[error("pool closed: {0}")]
    PoolClosed(&'static str),

    /// Output ranges could not be stitched back together.
    #[error("reassembly error: {0}")]
    Reassembly(String),

    /// A worker thread or runtime could not be started.
    #[error("failed to start workers: {0}")]
    Spawn(#[from] io::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

impl EngineError {
    /// True for the deadline failure, the one error callers may want to treat
    /// differently (e.g. retry with a larger deadline).
    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Timeout { .. })
    }
}
