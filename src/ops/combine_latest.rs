//! CombineLatest operator implementation

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

/// CombineLatest operator
///
/// Remembers the latest value of every input. Once each input has emitted at
/// least once, every further value from any input emits the current latest
/// values as a `Vec` in input order. Completes when all inputs completed; the
/// first error is forwarded at once and cancels the other inputs.
#[derive(Clone)]
pub struct CombineLatest<S> {
  sources: Vec<S>,
}

impl<S> CombineLatest<S> {
  pub fn new(sources: impl IntoIterator<Item = S>) -> Self {
    CombineLatest { sources: sources.into_iter().collect() }
  }
}

/// Combines the latest values of all `sources`, see [`CombineLatest`].
pub fn combine_latest<S: Observable>(sources: impl IntoIterator<Item = S>) -> CombineLatest<S> {
  CombineLatest::new(sources)
}

pub struct CombineLatestState<Item> {
  latest: Vec<Option<Item>>,
  active: usize,
}

pub struct CombineLatestObserver<Item, Err, O> {
  state: MutArc<CombineLatestState<Item>>,
  downstream: Downstream<Vec<Item>, Err, O>,
  index: usize,
}

impl<S> Observable for CombineLatest<S>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
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

    let state = MutArc::own(CombineLatestState { latest: vec![None; len], active: len });
    let downstream = Serialized::new(subscriber);
    subscribe_inputs(self.sources, &parent, |index| CombineLatestObserver {
      state: state.clone(),
      downstream: downstream.clone(),
      index,
    });
    parent
  }
}

impl<Item, Err, O> Observer<Item, Err> for CombineLatestObserver<Item, Err, O>
where
  O: Observer<Vec<Item>, Err>,
  Item: Clone,
{
  fn next(&mut self, value: Item) {
    {
      let mut state = self.state.rc_deref_mut();
      state.latest[self.index] = Some(value);
      if let Some(values) = state.latest.iter().cloned().collect::<Option<Vec<_>>>() {
        self.downstream.push(Notification::Next(values));
      }
    }
    self.downstream.drain();
  }

  fn error(self, err: Err) {
    if self.downstream.push(Notification::Error(err)) {
      debug!(input = self.index, "combine_latest input errored, cancelling the others");
    }
    self.downstream.drain();
  }

  fn complete(self) {
    {
      let mut state = self.state.rc_deref_mut();
      state.active -= 1;
      if state.active == 0 {
        self.downstream.push(Notification::Complete);
      }
    }
    self.downstream.drain();
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}
