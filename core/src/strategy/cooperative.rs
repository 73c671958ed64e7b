//! Cooperative-task strategy: one async task per chunk on a tokio runtime
//! with exactly `worker_count` worker threads, joined as a structured scope.
//!
//! The calling thread blocks on the scope. After a chunk fails, queued
//! chunks are skipped and the chunks already running are awaited, so the
//! call never returns with tasks still in flight. Only the deadline releases
//! the caller early: running chunks are then left on the detached runtime.
//!
//! The deadline is watched by a plain OS thread rather than a runtime timer:
//! tokio timers are driven by idle workers, and with every worker busy inside
//! a long transform they would fire late.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::constants::{COOP_THREAD_PREFIX, DEFAULT_DEADLINE};
use crate::partition::{CompletedChunk, Reassembler};
use crate::strategy::dispatch::{complete, plan, run_guarded, AbortFlag, Plan, Prepared};
use crate::strategy::{ConcurrencyStrategy, StrategyKind};
use crate::telemetry::Stage;
use crate::transform::BlockTransform;
use crate::types::EngineError;

#[derive(Debug, Clone)]
pub struct CooperativeTaskStrategy {
    deadline: Duration,
}

impl CooperativeTaskStrategy {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

impl Default for CooperativeTaskStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_DEADLINE)
    }
}

enum Race {
    Drained,
    Failed { error: EngineError, settled: bool },
    Expired,
}

impl ConcurrencyStrategy for CooperativeTaskStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Cooperative
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
        if Handle::try_current().is_ok() {
            return Err(EngineError::Validation(
                "cooperative strategy blocks the calling thread and cannot run inside an async runtime"
                    .into(),
            ));
        }

        let Prepared { tasks, mut reassembler, mut timer } =
            match plan(self.kind(), input, worker_count, chunk_size)? {
                Plan::Done(out) => return Ok(out),
                Plan::Dispatch(prepared) => prepared,
            };
        let total = tasks.len();
        let abort = AbortFlag::default();

        // 1️⃣ Fixed-size dispatcher
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_count)
            .thread_name(format!("{COOP_THREAD_PREFIX}-worker"))
            .build()?;
        let Watchdog { cancel, mut expired, handle } = Watchdog::start(self.deadline)?;

        // 2️⃣ Structured scope: spawn every chunk, wait for all or the deadline
        let race = runtime.block_on(async {
            let start = Instant::now();
            let mut scope = JoinSet::new();
            for task in tasks {
                let transform = Arc::clone(&transform);
                let abort = abort.clone();
                scope.spawn(async move { run_guarded(task, transform.as_ref(), &abort) });
            }
            timer.add_stage_time(Stage::Submit, start.elapsed());

            let start = Instant::now();
            let drained = tokio::select! {
                biased;
                drained = drain(&mut scope, &mut reassembler) => drained,
                Ok(()) = &mut expired => return Race::Expired,
            };
            timer.add_stage_time(Stage::Await, start.elapsed());

            let Err(error) = drained else {
                return Race::Drained;
            };

            // Queued chunks are skipped; wait out the ones already running.
            abort.raise();
            tokio::select! {
                biased;
                late = settle(&mut scope) => {
                    debug!(strategy = %self.kind(), late, "in-flight chunks settled after failure");
                    Race::Failed { error, settled: true }
                }
                Ok(()) = &mut expired => Race::Failed { error, settled: false },
            }
        });

        // Wakes the watchdog early when the scope finished first.
        drop(cancel);
        if handle.join().is_err() {
            debug!("deadline watchdog panicked");
        }

        // 3️⃣ Tear down the dispatcher
        match race {
            Race::Drained => drop(runtime),
            Race::Failed { error, settled } => {
                warn!(strategy = %self.kind(), error = %error, settled, "chunk failed, aborting call");
                if settled {
                    drop(runtime);
                } else {
                    runtime.shutdown_background();
                }
                return Err(error);
            }
            Race::Expired => {
                abort.raise();
                warn!(
                    strategy = %self.kind(),
                    completed = reassembler.completed(),
                    total,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "deadline elapsed before scope completed"
                );
                // In-flight chunks cannot be interrupted; do not wait for them.
                runtime.shutdown_background();
                return Err(EngineError::Timeout {
                    deadline: self.deadline,
                    completed: reassembler.completed(),
                    total,
                });
            }
        }

        complete(self.kind(), reassembler, timer)
    }
}

/// Join every task of the scope, placing each range as it completes.
async fn drain(
    scope: &mut JoinSet<Option<Result<CompletedChunk, EngineError>>>,
    reassembler: &mut Reassembler,
) -> Result<(), EngineError> {
    while let Some(joined) = scope.join_next().await {
        match joined {
            Ok(Some(Ok(done))) => {
                trace!(chunk = done.chunk().index, "chunk completed");
                reassembler.place(done)?;
            }
            Ok(Some(Err(e))) => return Err(e),
            // Skipped after another chunk failed; that failure is still queued.
            Ok(None) => continue,
            Err(join_err) => return Err(EngineError::WorkerPanicked(join_err.to_string())),
        }
    }
    if reassembler.pending() > 0 {
        return Err(EngineError::Reassembly(format!(
            "{} chunks skipped without a reported failure",
            reassembler.pending()
        )));
    }
    Ok(())
}

/// Await every task left in the scope, discarding results. Returns how many
/// chunks were still running and completed.
async fn settle(scope: &mut JoinSet<Option<Result<CompletedChunk, EngineError>>>) -> usize {
    let mut late = 0;
    while let Some(joined) = scope.join_next().await {
        if matches!(joined, Ok(Some(_))) {
            late += 1;
        }
    }
    late
}

/// OS thread that fires `expired` once the deadline passes, unless `cancel`
/// is dropped first.
struct Watchdog {
    cancel: Sender<()>,
    expired: oneshot::Receiver<()>,
    handle: JoinHandle<()>,
}

impl Watchdog {
    fn start(deadline: Duration) -> Result<Self, EngineError> {
        let (cancel, cancel_rx) = bounded::<()>(0);
        let (expired_tx, expired) = oneshot::channel();

        let handle = thread::Builder::new()
            .name(format!("{COOP_THREAD_PREFIX}-deadline"))
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(deadline) {
                    let _ = expired_tx.send(());
                }
            })?;

        Ok(Self {
            cancel,
            expired,
            handle,
        })
    }
}
