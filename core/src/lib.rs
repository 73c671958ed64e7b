//! des-parallel-core
//!
//! Chunked, concurrent DES-ECB with pluggable concurrency strategies.
//!
//! A buffer is split into fixed-size chunks, every chunk is transformed by
//! its own task, and each task writes straight into its own disjoint range of
//! one preallocated output buffer. Two strategies satisfy the same contract:
//! a worker pool of OS threads and cooperative tasks on an async runtime.
//!
//! ```rust,no_run
//! use des_parallel_core::prelude::*;
//!
//! let engine = DesEngine::new(None)?;
//! let strategy = WorkerPoolStrategy::default();
//! let data = vec![0u8; 4 * 1024 * 1024];
//!
//! let ciphertext = engine.encrypt_parallel(data.clone(), 4, 64 * 1024, &strategy)?;
//! let plaintext = engine.decrypt_parallel(ciphertext, 4, 64 * 1024, &strategy)?;
//! assert_eq!(&plaintext[..], &data[..]);
//! # Ok::<(), des_parallel_core::EngineError>(())
//! ```

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;

pub mod partition;
pub mod transform;
pub mod strategy;
pub mod telemetry;

pub mod engine;

pub use types::EngineError;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::DesEngine;
    pub use crate::partition::{Chunk, Partition};
    pub use crate::strategy::{
        ConcurrencyStrategy, CooperativeTaskStrategy, StrategyKind, WorkerPoolStrategy,
    };
    pub use crate::telemetry::{measure, measure_and_log, Measurement};
    pub use crate::transform::{BlockTransform, Direction, IdentityTransform, SecretKey};
    pub use crate::types::EngineError;
}
