//! Engine configuration: worker count, chunk size, deadline, strategy.
//!
//! These are the only externally visible knobs of the engine. Defaults match
//! the reference benchmark run (5 workers, 1 MiB chunks, 120 s deadline).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_DEADLINE, DEFAULT_WORKERS};
use crate::strategy::{ConcurrencyStrategy, StrategyKind};
use crate::types::EngineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub worker_count: usize,
    pub chunk_size: usize,
    pub deadline_ms: u64,
    pub strategy: StrategyKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            deadline_ms: DEFAULT_DEADLINE.as_millis() as u64,
            strategy: StrategyKind::WorkerPool,
        }
    }
}

impl EngineConfig {
    /// Size the pool from the machine: one worker per core, leaving one free.
    pub fn dynamic() -> Self {
        let cores = num_cpus::get();
        Self {
            worker_count: cores.saturating_sub(1).max(1),
            ..Self::default()
        }
    }

    pub fn from_json(s: &str) -> Result<Self, EngineError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = deadline.as_millis() as u64;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        validate_request(self.worker_count, self.chunk_size)?;
        if self.deadline_ms == 0 {
            return Err(EngineError::Config("deadline must be greater than zero".into()));
        }
        Ok(())
    }

    /// Strategy instance selected by this config.
    pub fn build_strategy(&self) -> Result<Box<dyn ConcurrencyStrategy>, EngineError> {
        self.validate()?;
        Ok(self.strategy.build(self.deadline()))
    }
}

/// Parameter checks shared by every strategy entry point.
pub fn validate_request(worker_count: usize, chunk_size: usize) -> Result<(), EngineError> {
    if worker_count < 1 {
        return Err(EngineError::Validation(format!(
            "invalid worker count: {worker_count}, must be at least 1"
        )));
    }
    if chunk_size < 1 {
        return Err(EngineError::Validation("chunk size must be at least 1".into()));
    }
    Ok(())
}
