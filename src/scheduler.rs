//! Execution units and timers.
//!
//! The core only needs two things from its environment: run a production
//! procedure concurrently and get back a handle that can stop it, and a future
//! that resolves after a duration. [`Scheduler`] is that seam.

use futures::{
  future::{AbortHandle, Abortable, BoxFuture},
  Future,
};
use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  time::{Duration, Instant},
};
use tracing::trace;

use crate::subscription::SubscriptionLike;

#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Runs `task` concurrently. Unsubscribing the returned handle drops the
  /// task at its next suspension point.
  fn spawn<F>(&self, task: F) -> SpawnHandle
  where
    F: Future<Output = ()> + Send + 'static;

  /// A future resolving once `duration` has elapsed. Create it from inside a
  /// spawned task, some timer backends bind to the runtime they are created
  /// on.
  fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;

  /// The clock `sleep` measures against.
  fn now(&self) -> Instant { Instant::now() }

  /// Runs `task` once, after `delay` if one is given.
  fn schedule<F>(&self, task: F, delay: Option<Duration>) -> SpawnHandle
  where
    F: FnOnce() + Send + 'static,
  {
    let timer = self.clone();
    self.spawn(async move {
      if let Some(delay) = delay {
        timer.sleep(delay).await;
      }
      task();
    })
  }
}

/// Stops a spawned task.
#[derive(Clone)]
pub struct SpawnHandle {
  handle: AbortHandle,
  finished: Arc<AtomicBool>,
}

impl SpawnHandle {
  /// Wraps `task` so it can be aborted and reports when it is done. The
  /// returned future is what the executor should run.
  pub fn new<F>(task: F) -> (impl Future<Output = ()> + Send + 'static, SpawnHandle)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    trace!("spawn task");
    let (handle, registration) = AbortHandle::new_pair();
    let finished = Arc::new(AtomicBool::new(false));
    let c_finished = finished.clone();
    let task = Abortable::new(task, registration);
    let fut = async move {
      let _ = task.await;
      c_finished.store(true, Ordering::Release);
    };
    (fut, SpawnHandle { handle, finished })
  }
}

impl SubscriptionLike for SpawnHandle {
  fn unsubscribe(&mut self) {
    if !self.is_closed() {
      trace!("abort spawned task");
      self.handle.abort();
    }
  }

  fn is_closed(&self) -> bool { self.finished.load(Ordering::Acquire) || self.handle.is_aborted() }
}
