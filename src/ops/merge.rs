//! Merge operator implementation

use tracing::debug;

use crate::{
  notification::Notification,
  observable::Observable,
  observer::Observer,
  ops::{subscribe_inputs, Downstream},
  rc::MutArc,
  serialized::Serialized,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Merge operator
///
/// Forwards every value of every input in arrival order. Completes once all
/// inputs completed; the first error is forwarded at once and cancels the
/// remaining inputs.
#[derive(Clone)]
pub struct Merge<S> {
  sources: Vec<S>,
}

impl<S> Merge<S> {
  pub fn new(sources: impl IntoIterator<Item = S>) -> Self {
    Merge { sources: sources.into_iter().collect() }
  }
}

/// Merges all `sources` into one stream, see [`Merge`].
pub fn merge<S: Observable>(sources: impl IntoIterator<Item = S>) -> Merge<S> {
  Merge::new(sources)
}

pub struct MergeObserver<Item, Err, O> {
  downstream: Downstream<Item, Err, O>,
  /// Inputs that have not completed yet.
  active: MutArc<usize>,
  index: usize,
}

impl<S> Observable for Merge<S>
where
  S: Observable,
  S::Item: Send + 'static,
  S::Err: Send + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let parent = subscriber.subscription().clone();
    let active = self.sources.len();
    if active == 0 {
      subscriber.complete();
      return parent;
    }

    let downstream = Serialized::new(subscriber);
    let active = MutArc::own(active);
    subscribe_inputs(self.sources, &parent, |index| MergeObserver {
      downstream: downstream.clone(),
      active: active.clone(),
      index,
    });
    parent
  }
}

impl<Item, Err, O> Observer<Item, Err> for MergeObserver<Item, Err, O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.downstream.emit(Notification::Next(value)); }

  fn error(self, err: Err) {
    if self.downstream.push(Notification::Error(err)) {
      debug!(input = self.index, "merge input errored, cancelling the others");
    }
    self.downstream.drain();
  }

  fn complete(self) {
    let done = {
      let mut active = self.active.rc_deref_mut();
      *active -= 1;
      *active == 0
    };
    if done {
      self.downstream.emit(Notification::Complete);
    }
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}
