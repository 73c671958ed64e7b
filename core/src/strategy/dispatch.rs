//! Pieces shared by every strategy: request checks, partitioning into tasks,
//! guarded task execution, and final reassembly.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, info};

use crate::config::validate_request;
use crate::partition::{ChunkTask, CompletedChunk, Partition, Reassembler};
use crate::strategy::StrategyKind;
use crate::telemetry::{Stage, TelemetryTimer};
use crate::transform::BlockTransform;
use crate::types::EngineError;

/// Work left to do after partitioning.
pub(crate) struct Prepared {
    pub tasks: Vec<ChunkTask>,
    pub reassembler: Reassembler,
    pub timer: TelemetryTimer,
}

pub(crate) enum Plan {
    /// Zero chunks: nothing to dispatch, output is already final.
    Done(Bytes),
    Dispatch(Prepared),
}

pub(crate) fn plan(
    kind: StrategyKind,
    input: Bytes,
    worker_count: usize,
    chunk_size: usize,
) -> Result<Plan, EngineError> {
    validate_request(worker_count, chunk_size)?;

    let mut timer = TelemetryTimer::new();
    let start = Instant::now();
    let partition = Partition::new(input.len(), chunk_size)?;
    let (tasks, reassembler) = partition.split(input)?;
    timer.add_stage_time(Stage::Partition, start.elapsed());

    if tasks.is_empty() {
        debug!(
            strategy = %kind,
            len = partition.buffer_len(),
            chunk_size,
            "no full chunk, nothing to dispatch"
        );
        return Ok(Plan::Done(reassembler.finish()?));
    }

    debug!(
        strategy = %kind,
        chunks = partition.chunk_count(),
        tail = partition.tail_len(),
        workers = worker_count,
        "dispatching chunks"
    );
    Ok(Plan::Dispatch(Prepared {
        tasks,
        reassembler,
        timer,
    }))
}

pub(crate) fn complete(
    kind: StrategyKind,
    reassembler: Reassembler,
    mut timer: TelemetryTimer,
) -> Result<Bytes, EngineError> {
    let chunks = reassembler.total();
    let out = timer.time(Stage::Reassemble, || reassembler.finish())?;
    timer.finish();
    info!(
        strategy = %kind,
        chunks,
        elapsed_ms = timer.elapsed().as_secs_f64() * 1_000.0,
        stages = %timer.stage_times.summary(),
        "dispatch complete"
    );
    Ok(out)
}

/// Raised on the first failure of a call. Workers check it before starting a
/// chunk; chunks already running are left to finish.
#[derive(Debug, Clone, Default)]
pub(crate) struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run one chunk unless the call already failed. `None` means skipped.
/// Panics in the transform become `WorkerPanicked` and raise the flag.
pub(crate) fn run_guarded(
    task: ChunkTask,
    transform: &dyn BlockTransform,
    abort: &AbortFlag,
) -> Option<Result<CompletedChunk, EngineError>> {
    if abort.is_raised() {
        return None;
    }

    let index = task.chunk().index;
    let result = panic::catch_unwind(AssertUnwindSafe(|| task.run(transform)))
        .unwrap_or_else(|payload| {
            Err(EngineError::WorkerPanicked(format!(
                "chunk {index}: {}",
                panic_message(payload.as_ref())
            )))
        });

    if result.is_err() {
        abort.raise();
    }
    Some(result)
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
