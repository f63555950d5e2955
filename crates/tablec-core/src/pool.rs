//! Bounded worker pool for the parallel phases.
//!
//! Tasks are fed through a bounded channel to at most `workers` scoped
//! threads. Results come back tagged with their task index and are returned
//! in submission order once every task has finished. Progress is reported
//! by polling a completed-task counter.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use tracing::{debug, error};

use tablec_model::{Result, TablecError};

/// A parallel phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Ingest,
    References,
    Validate,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Ingest => "ingest",
            Phase::References => "references",
            Phase::Validate => "validate",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives polled progress from the coordinator thread.
pub trait ProgressObserver {
    fn phase_started(&self, _phase: Phase, _total: usize) {}
    fn progress(&self, _phase: Phase, _completed: usize, _total: usize) {}
    fn phase_finished(&self, _phase: Phase) {}
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    poll_interval: Duration,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Runs `work` over every task and returns the results in task order.
    ///
    /// A panicking task fails the whole phase after the remaining tasks
    /// have drained.
    pub fn run<T, R, F>(
        &self,
        phase: Phase,
        tasks: &[T],
        observer: &dyn ProgressObserver,
        work: F,
    ) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        let total = tasks.len();
        observer.phase_started(phase, total);
        if total == 0 {
            observer.phase_finished(phase);
            return Ok(Vec::new());
        }

        let workers = self.workers.min(total);
        debug!(%phase, tasks = total, workers, "starting worker pool");
        let completed = AtomicUsize::new(0);
        let mut results: Vec<Option<R>> = (0..total).map(|_| None).collect();
        let mut panicked = None;

        thread::scope(|scope| {
            let (task_tx, task_rx) = crossbeam_channel::bounded::<usize>(workers);
            let (result_tx, result_rx) = crossbeam_channel::unbounded();

            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let completed = &completed;
                let work = &work;
                scope.spawn(move || {
                    for idx in task_rx.iter() {
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&tasks[idx])));
                        completed.fetch_add(1, Ordering::Relaxed);
                        if result_tx.send((idx, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(task_rx);
            drop(result_tx);

            scope.spawn(move || {
                for idx in 0..total {
                    if task_tx.send(idx).is_err() {
                        break;
                    }
                }
            });

            loop {
                match result_rx.recv_timeout(self.poll_interval) {
                    Ok((idx, Ok(result))) => results[idx] = Some(result),
                    Ok((idx, Err(_))) => {
                        error!(%phase, task = idx, "worker panicked");
                        panicked.get_or_insert(idx);
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                observer.progress(phase, completed.load(Ordering::Relaxed), total);
            }
        });
        observer.phase_finished(phase);

        if let Some(task) = panicked {
            return Err(TablecError::WorkerPanicked {
                phase: phase.as_str(),
                task,
            });
        }
        results
            .into_iter()
            .enumerate()
            .map(|(task, result)| {
                result.ok_or(TablecError::WorkerPanicked {
                    phase: phase.as_str(),
                    task,
                })
            })
            .collect()
    }
}
