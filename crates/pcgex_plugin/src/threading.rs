//! Background task manager using rayon.
//!
//! Every node execution owns one [`TaskManager`]. Work is submitted with
//! [`TaskManager::start`] and runs on:
//! - the driving thread itself (`inline`, async processing disabled)
//! - rayon's global pool (`global`)
//! - a dedicated bounded pool (`with_threads` / `with_pool`)
//!
//! The driving thread never waits on tasks during normal operation; it polls
//! [`TaskManager::is_complete`] once per tick. Only teardown blocks, in
//! [`TaskManager::wait_for_drain`].
//!
//! # Usage
//!
//! ```ignore
//! let tasks = TaskManager::global();
//! tasks.start(move |token| {
//!     if token.checkpoint().is_err() {
//!         return TaskOutcome::Cancelled;
//!     }
//!     expensive_computation();
//!     TaskOutcome::Success
//! });
//!
//! // Next ticks
//! if tasks.is_complete() {
//!     // All results delivered
//! }
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use rayon::ThreadPool;
use tracing::{trace, warn};

use crate::config::ProcessorSettings;
use crate::error::{Cancelled, ConfigError};

/// Cooperative cancellation flag shared between a manager and its tasks.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::Release);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }

  /// `Err(Cancelled)` once cancellation was requested.
  #[inline]
  pub fn checkpoint(&self) -> Result<(), Cancelled> {
    if self.is_cancelled() {
      Err(Cancelled)
    } else {
      Ok(())
    }
  }
}

/// How a task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
  Success,
  Failed,
  /// Stopped at a checkpoint, or never started. Not a failure.
  Cancelled,
}

impl TaskOutcome {
  pub fn from_success(success: bool) -> Self {
    if success {
      Self::Success
    } else {
      Self::Failed
    }
  }
}

impl From<Result<(), Cancelled>> for TaskOutcome {
  fn from(result: Result<(), Cancelled>) -> Self {
    match result {
      Ok(()) => Self::Success,
      Err(Cancelled) => Self::Cancelled,
    }
  }
}

/// Counters since creation or the last [`TaskManager::reset`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskStats {
  pub submitted: u64,
  pub succeeded: u64,
  pub failed: u64,
  pub cancelled: u64,
}

enum Executor {
  Inline,
  Global,
  Pool(Arc<ThreadPool>),
}

#[derive(Default)]
struct Shared {
  outstanding: Mutex<usize>,
  drained: Condvar,
  submitted: AtomicU64,
  succeeded: AtomicU64,
  failed: AtomicU64,
  cancelled: AtomicU64,
}

impl Shared {
  fn begin(&self) {
    self.submitted.fetch_add(1, Ordering::Relaxed);
    *self.outstanding.lock() += 1;
  }

  fn finish(&self, outcome: TaskOutcome) {
    let counter = match outcome {
      TaskOutcome::Success => &self.succeeded,
      TaskOutcome::Failed => &self.failed,
      TaskOutcome::Cancelled => &self.cancelled,
    };
    counter.fetch_add(1, Ordering::Relaxed);

    let mut outstanding = self.outstanding.lock();
    *outstanding -= 1;
    if *outstanding == 0 {
      self.drained.notify_all();
    }
  }
}

/// Tracks the background tasks of one node execution.
pub struct TaskManager {
  executor: Executor,
  shared: Arc<Shared>,
  token: CancellationToken,
}

impl TaskManager {
  fn with_executor(executor: Executor) -> Self {
    Self {
      executor,
      shared: Arc::new(Shared::default()),
      token: CancellationToken::new(),
    }
  }

  /// Run every task synchronously inside `start`.
  pub fn inline() -> Self {
    Self::with_executor(Executor::Inline)
  }

  /// Spawn on rayon's global pool.
  pub fn global() -> Self {
    Self::with_executor(Executor::Global)
  }

  /// Spawn on a dedicated pool of `num_threads` workers.
  pub fn with_threads(num_threads: usize) -> Result<Self, ConfigError> {
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(num_threads)
      .thread_name(|index| format!("pcgex-worker-{index}"))
      .build()?;
    Ok(Self::with_pool(Arc::new(pool)))
  }

  /// Spawn on an existing pool, shared with other managers.
  pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
    Self::with_executor(Executor::Pool(pool))
  }

  pub fn for_settings(settings: &ProcessorSettings) -> Result<Self, ConfigError> {
    if !settings.do_async_processing {
      Ok(Self::inline())
    } else if settings.worker_threads > 0 {
      Self::with_threads(settings.worker_threads)
    } else {
      Ok(Self::global())
    }
  }

  /// False when tasks run inline.
  pub fn is_async(&self) -> bool {
    !matches!(self.executor, Executor::Inline)
  }

  /// Worker threads available to this manager.
  pub fn num_threads(&self) -> usize {
    match &self.executor {
      Executor::Inline => 1,
      Executor::Global => rayon::current_num_threads(),
      Executor::Pool(pool) => pool.current_num_threads(),
    }
  }

  pub fn token(&self) -> &CancellationToken {
    &self.token
  }

  /// Submit a task. The outstanding count is raised before dispatch, so
  /// [`Self::is_complete`] cannot observe a gap between submission and start.
  ///
  /// A panicking task is reported as [`TaskOutcome::Failed`]; a task dequeued
  /// after cancellation is reported as [`TaskOutcome::Cancelled`] without
  /// running.
  pub fn start<F>(&self, work: F)
  where
    F: FnOnce(&CancellationToken) -> TaskOutcome + Send + 'static,
  {
    self.shared.begin();
    let shared = Arc::clone(&self.shared);
    let token = self.token.clone();
    let job = move || {
      let outcome = run_guarded(&token, work);
      trace!(?outcome, "task finished");
      shared.finish(outcome);
    };

    match &self.executor {
      Executor::Inline => job(),
      Executor::Global => rayon::spawn(job),
      Executor::Pool(pool) => pool.spawn(job),
    }
  }

  /// Tasks submitted and not yet finished.
  pub fn outstanding(&self) -> usize {
    *self.shared.outstanding.lock()
  }

  pub fn is_complete(&self) -> bool {
    self.outstanding() == 0
  }

  pub fn stats(&self) -> TaskStats {
    TaskStats {
      submitted: self.shared.submitted.load(Ordering::Relaxed),
      succeeded: self.shared.succeeded.load(Ordering::Relaxed),
      failed: self.shared.failed.load(Ordering::Relaxed),
      cancelled: self.shared.cancelled.load(Ordering::Relaxed),
    }
  }

  /// Clear the counters. No-op (returns false) while tasks are in flight.
  pub fn reset(&self) -> bool {
    let outstanding = self.shared.outstanding.lock();
    if *outstanding > 0 {
      return false;
    }
    self.shared.submitted.store(0, Ordering::Relaxed);
    self.shared.succeeded.store(0, Ordering::Relaxed);
    self.shared.failed.store(0, Ordering::Relaxed);
    self.shared.cancelled.store(0, Ordering::Relaxed);
    true
  }

  /// Flag every current and future task as cancelled.
  pub fn cancel(&self) {
    self.token.cancel();
  }

  /// Block until no task is outstanding.
  pub fn wait_for_drain(&self) {
    let mut outstanding = self.shared.outstanding.lock();
    while *outstanding > 0 {
      self.shared.drained.wait(&mut outstanding);
    }
  }
}

impl Drop for TaskManager {
  fn drop(&mut self) {
    if self.is_complete() {
      return;
    }
    warn!(
      outstanding = self.outstanding(),
      "tearing down with tasks in flight, cancelling"
    );
    self.cancel();
    self.wait_for_drain();
  }
}

fn run_guarded<F>(token: &CancellationToken, work: F) -> TaskOutcome
where
  F: FnOnce(&CancellationToken) -> TaskOutcome,
{
  if token.is_cancelled() {
    return TaskOutcome::Cancelled;
  }
  match panic::catch_unwind(AssertUnwindSafe(|| work(token))) {
    Ok(outcome) => outcome,
    Err(_) => {
      warn!("task panicked");
      TaskOutcome::Failed
    }
  }
}

#[cfg(test)]
#[path = "threading_test.rs"]
mod threading_test;
