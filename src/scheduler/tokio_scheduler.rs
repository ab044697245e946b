use futures::{
  future::{BoxFuture, FutureExt},
  Future,
};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

use super::{Scheduler, SpawnHandle};

/// Spawns onto a tokio runtime and uses `tokio::time` for timers, so tests can
/// drive it with paused virtual time.
#[derive(Clone, Debug)]
pub struct TokioScheduler(Handle);

impl TokioScheduler {
  /// The runtime the caller is running on.
  ///
  /// # Panics
  ///
  /// When called outside of a tokio runtime.
  pub fn current() -> Self { TokioScheduler(Handle::current()) }
}

impl From<Handle> for TokioScheduler {
  fn from(handle: Handle) -> Self { TokioScheduler(handle) }
}

impl Scheduler for TokioScheduler {
  fn spawn<F>(&self, task: F) -> SpawnHandle
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let (fut, handle) = SpawnHandle::new(task);
    drop(self.0.spawn(fut));
    handle
  }

  fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
    tokio::time::sleep(duration).boxed()
  }

  /// Follows tokio's clock, which stands still while time is paused.
  fn now(&self) -> Instant { tokio::time::Instant::now().into_std() }
}
