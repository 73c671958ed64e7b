//! Interchangeable concurrency strategies for chunk dispatch.
//!
//! Every strategy satisfies the same contract:
//! - one task per chunk of the partition, submitted in chunk order
//! - each task writes only its own output range, completion order is free
//! - the caller blocks until every task finished or the deadline passed
//! - any failure fails the whole call; no partial buffer is returned
//!
//! Given identical inputs, all strategies produce byte-identical output.

mod dispatch;
pub mod worker_pool;
pub mod cooperative;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::transform::BlockTransform;
use crate::types::EngineError;

pub use cooperative::CooperativeTaskStrategy;
pub use worker_pool::WorkerPoolStrategy;

/// Maps (transform, buffer, worker count, chunk size) to an output buffer of
/// the same length.
pub trait ConcurrencyStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// How long the caller waits for all chunks before failing.
    fn deadline(&self) -> Duration;

    /// Partition `input`, run `transform` on every chunk concurrently, and
    /// return the reassembled output. Trailing bytes past the last full
    /// chunk stay zero.
    fn dispatch(
        &self,
        transform: Arc<dyn BlockTransform>,
        input: Bytes,
        worker_count: usize,
        chunk_size: usize,
    ) -> Result<Bytes, EngineError>;

    /// Dispatch with an encrypting transform.
    fn encode(
        &self,
        encryptor: Arc<dyn BlockTransform>,
        input: Bytes,
        worker_count: usize,
        chunk_size: usize,
    ) -> Result<Bytes, EngineError> {
        self.dispatch(encryptor, input, worker_count, chunk_size)
    }

    /// Dispatch with a decrypting transform.
    fn decode(
        &self,
        decryptor: Arc<dyn BlockTransform>,
        input: Bytes,
        worker_count: usize,
        chunk_size: usize,
    ) -> Result<Bytes, EngineError> {
        self.dispatch(decryptor, input, worker_count, chunk_size)
    }
}

/// Runtime selector for a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// OS thread pool fed by a task queue; completions come back as futures
    /// on a channel.
    WorkerPool,
    /// One cooperative task per chunk on a fixed-size async runtime, joined
    /// as a structured scope.
    Cooperative,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::WorkerPool, StrategyKind::Cooperative];

    pub fn build(self, deadline: Duration) -> Box<dyn ConcurrencyStrategy> {
        match self {
            StrategyKind::WorkerPool => Box::new(WorkerPoolStrategy::new(deadline)),
            StrategyKind::Cooperative => Box::new(CooperativeTaskStrategy::new(deadline)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::WorkerPool => "worker_pool",
            StrategyKind::Cooperative => "cooperative",
        };
        f.write_str(name)
    }
}
