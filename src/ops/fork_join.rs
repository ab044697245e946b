//! ForkJoin operator implementation

use tracing::{debug, trace};

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

/// ForkJoin operator
///
/// Waits for every input to complete, then emits the last value of each as
/// one `Vec` in input order and completes. If an input completes without
/// having emitted anything there is nothing to join: the result completes
/// without a value. The first error is forwarded at once, cancels the other
/// inputs and suppresses the joined value.
#[derive(Clone)]
pub struct ForkJoin<S> {
  sources: Vec<S>,
}

impl<S> ForkJoin<S> {
  pub fn new(sources: impl IntoIterator<Item = S>) -> Self {
    ForkJoin { sources: sources.into_iter().collect() }
  }
}

/// Joins the last values of all `sources`, see [`ForkJoin`].
pub fn fork_join<S: Observable>(sources: impl IntoIterator<Item = S>) -> ForkJoin<S> {
  ForkJoin::new(sources)
}

pub struct ForkJoinState<Item> {
  last: Vec<Option<Item>>,
  remaining: usize,
}

pub struct ForkJoinObserver<Item, Err, O> {
  state: MutArc<ForkJoinState<Item>>,
  downstream: Downstream<Vec<Item>, Err, O>,
  index: usize,
}

impl<S> Observable for ForkJoin<S>
where
  S: Observable,
  S::Item: Send + 'static,
  S::Err: Send + 'static,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let parent = subscriber.subscription().clone();
    let len = self.sources.len();
    if len == 0 {
      subscriber.complete();
      return parent;
    }

    let state =
      MutArc::own(ForkJoinState { last: (0..len).map(|_| None).collect(), remaining: len });
    let downstream = Serialized::new(subscriber);
    subscribe_inputs(self.sources, &parent, |index| ForkJoinObserver {
      state: state.clone(),
      downstream: downstream.clone(),
      index,
    });
    parent
  }
}

impl<Item, Err, O> Observer<Item, Err> for ForkJoinObserver<Item, Err, O>
where
  O: Observer<Vec<Item>, Err>,
{
  fn next(&mut self, value: Item) { self.state.rc_deref_mut().last[self.index] = Some(value); }

  fn error(self, err: Err) {
    if self.downstream.push(Notification::Error(err)) {
      debug!(input = self.index, "fork_join input errored, cancelling the others");
    }
    self.downstream.drain();
  }

  fn complete(self) {
    {
      let mut state = self.state.rc_deref_mut();
      state.remaining -= 1;
      if state.remaining > 0 {
        return;
      }
      match std::mem::take(&mut state.last).into_iter().collect::<Option<Vec<_>>>() {
        Some(values) => {
          self.downstream.push(Notification::Next(values));
        }
        None => trace!("fork_join input completed empty, nothing to join"),
      }
      self.downstream.push(Notification::Complete);
    }
    self.downstream.drain();
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}
