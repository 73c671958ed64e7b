//! Worker-pool strategy: a fixed set of OS threads pulling chunk tasks from a
//! queue, each completion flowing back as a result on a channel.
//!
//! Layout of one call:
//! [ spawn `worker_count` threads ] -> [ submit every chunk, close queue ]
//! -> [ collect completions until done or deadline ] -> [ join, reassemble ]

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, trace, warn};

use crate::constants::{DEFAULT_DEADLINE, POOL_THREAD_PREFIX};
use crate::partition::{ChunkTask, CompletedChunk};
use crate::strategy::dispatch::{complete, panic_message, plan, run_guarded, AbortFlag, Plan, Prepared};
use crate::strategy::{ConcurrencyStrategy, StrategyKind};
use crate::telemetry::Stage;
use crate::transform::BlockTransform;
use crate::types::EngineError;

type ChunkResult = Result<CompletedChunk, EngineError>;

#[derive(Debug, Clone)]
pub struct WorkerPoolStrategy {
    deadline: Duration,
}

impl WorkerPoolStrategy {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

impl Default for WorkerPoolStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_DEADLINE)
    }
}

impl ConcurrencyStrategy for WorkerPoolStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WorkerPool
    }

    fn deadline(&self) -> Duration {
        self.deadline
    }

    fn dispatch(
        &self,
        transform: Arc<dyn BlockTransform>,
        input: Bytes,
        worker_count: usize,
        chunk_size: usize,
    ) -> Result<Bytes, EngineError> {
        let Prepared { tasks, mut reassembler, mut timer } =
            match plan(self.kind(), input, worker_count, chunk_size)? {
                Plan::Done(out) => return Ok(out),
                Plan::Dispatch(prepared) => prepared,
            };
        let total = tasks.len();
        let abort = AbortFlag::default();

        // 1️⃣ Fixed-size pool
        let start = Instant::now();
        let (task_tx, task_rx) = unbounded::<ChunkTask>();
        let (done_tx, done_rx) = unbounded::<ChunkResult>();

        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let rx = task_rx.clone();
            let tx = done_tx.clone();
            let transform = Arc::clone(&transform);
            let abort_ref = abort.clone();
            let spawned = thread::Builder::new()
                .name(format!("{POOL_THREAD_PREFIX}-{worker_id}"))
                .spawn(move || run_worker(worker_id, transform.as_ref(), rx, tx, abort_ref));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Dropping task_tx on return lets already started workers exit.
                    abort.raise();
                    return Err(EngineError::Spawn(e));
                }
            }
        }
        drop(task_rx);
        drop(done_tx);

        // 2️⃣ Submit every chunk in partition order, then close the queue
        for task in tasks {
            task_tx
                .send(task)
                .map_err(|_| EngineError::PoolClosed("task queue closed during submission"))?;
        }
        drop(task_tx);
        timer.add_stage_time(Stage::Submit, start.elapsed());

        // 3️⃣ Collect completions under the deadline
        let start = Instant::now();
        // `None` when the deadline is too far out to represent: wait unbounded.
        let deadline_at = start.checked_add(self.deadline);
        while reassembler.pending() > 0 {
            let received = match deadline_at {
                Some(at) => done_rx.recv_deadline(at),
                None => done_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(Ok(done)) => {
                    trace!(chunk = done.chunk().index, "chunk completed");
                    if let Err(e) = reassembler.place(done) {
                        abort.raise();
                        return Err(e);
                    }
                }
                Ok(Err(e)) => {
                    abort.raise();
                    warn!(strategy = %self.kind(), error = %e, "chunk failed, aborting call");
                    return Err(e);
                }
                Err(RecvTimeoutError::Timeout) => {
                    abort.raise();
                    warn!(
                        strategy = %self.kind(),
                        completed = reassembler.completed(),
                        total,
                        deadline_ms = self.deadline.as_millis() as u64,
                        "deadline elapsed before pool drained"
                    );
                    // Workers are detached; in-flight chunks finish and are discarded.
                    return Err(EngineError::Timeout {
                        deadline: self.deadline,
                        completed: reassembler.completed(),
                        total,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    abort.raise();
                    return Err(EngineError::PoolClosed(
                        "all workers exited with chunks outstanding",
                    ));
                }
            }
        }
        timer.add_stage_time(Stage::Await, start.elapsed());

        // 4️⃣ Tear down: the queue is closed and drained, every worker is exiting
        for handle in workers {
            handle
                .join()
                .map_err(|payload| EngineError::WorkerPanicked(panic_message(payload.as_ref())))?;
        }

        complete(self.kind(), reassembler, timer)
    }
}

/// Worker loop: pull tasks until the queue closes, send each result back.
fn run_worker(
    worker_id: usize,
    transform: &dyn BlockTransform,
    rx: Receiver<ChunkTask>,
    tx: Sender<ChunkResult>,
    abort: AbortFlag,
) {
    trace!(worker_id, "worker started");
    let mut processed = 0usize;

    while let Ok(task) = rx.recv() {
        let index = task.chunk().index;
        let Some(result) = run_guarded(task, transform, &abort) else {
            trace!(worker_id, chunk = index, "call aborted, skipping chunk");
            continue;
        };
        processed += 1;

        if tx.send(result).is_err() {
            // Caller gave up (timeout or failure); nothing left to report to.
            debug!(worker_id, processed, "result channel closed, worker exiting");
            return;
        }
    }
    trace!(worker_id, processed, "queue drained, worker exiting");
}
