use futures::{
  executor::ThreadPool,
  future::{BoxFuture, FutureExt},
  Future,
};
use std::time::Duration;

use super::{Scheduler, SpawnHandle};

impl Scheduler for ThreadPool {
  fn spawn<F>(&self, task: F) -> SpawnHandle
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let (fut, handle) = SpawnHandle::new(task);
    self.spawn_ok(fut);
    handle
  }

  fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
    futures_time::task::sleep(duration.into()).map(|_| ()).boxed()
  }
}
