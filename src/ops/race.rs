//! Race operator implementation

use tracing::debug;

use crate::{
  notification::Notification,
  observable::Observable,
  observer::Observer,
  ops::Downstream,
  rc::MutArc,
  serialized::Serialized,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike},
};

/// Race operator
///
/// Mirrors the input that notifies first. The first notification of any
/// kind, a value, an error or a completion, decides the winner; every other
/// input is cancelled right away and only the winner is forwarded from then
/// on. Racing zero inputs completes immediately.
#[derive(Clone)]
pub struct Race<S> {
  sources: Vec<S>,
}

impl<S> Race<S> {
  pub fn new(sources: impl IntoIterator<Item = S>) -> Self {
    Race { sources: sources.into_iter().collect() }
  }
}

/// Mirrors whichever of `sources` notifies first, see [`Race`].
pub fn race<S: Observable>(sources: impl IntoIterator<Item = S>) -> Race<S> { Race::new(sources) }

pub struct RaceState {
  winner: Option<usize>,
  /// Input subscriptions, emptied once the race is decided.
  inputs: Vec<Subscription>,
}

pub struct RaceObserver<Item, Err, O> {
  state: MutArc<RaceState>,
  downstream: Downstream<Item, Err, O>,
  index: usize,
}

impl<Item, Err, O> RaceObserver<Item, Err, O> {
  /// Whether this input owns the output. The first caller wins and cancels
  /// the others.
  fn claim(&self) -> bool {
    let mut state = self.state.rc_deref_mut();
    match state.winner {
      Some(winner) => winner == self.index,
      None => {
        state.winner = Some(self.index);
        let mut inputs = std::mem::take(&mut state.inputs);
        drop(state);
        debug!(winner = self.index, "race decided");
        for (index, input) in inputs.iter_mut().enumerate() {
          if index != self.index {
            input.unsubscribe();
          }
        }
        true
      }
    }
  }
}

impl<S> Observable for Race<S>
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
    if self.sources.is_empty() {
      subscriber.complete();
      return parent;
    }

    let inputs: Vec<Subscription> = self.sources.iter().map(|_| Subscription::new()).collect();
    for input in &inputs {
      parent.add(input.clone());
    }
    let state = MutArc::own(RaceState { winner: None, inputs: inputs.clone() });
    let downstream = Serialized::new(subscriber);

    for (index, (source, input)) in self.sources.into_iter().zip(inputs).enumerate() {
      // decided already by an input that notified during its subscribe call
      if input.is_closed() {
        continue;
      }
      let observer = RaceObserver { state: state.clone(), downstream: downstream.clone(), index };
      source.actual_subscribe(Subscriber::with_subscription(observer, input));
    }
    parent
  }
}

impl<Item, Err, O> Observer<Item, Err> for RaceObserver<Item, Err, O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.claim() {
      self.downstream.emit(Notification::Next(value));
    }
  }

  fn error(self, err: Err) {
    if self.claim() {
      self.downstream.emit(Notification::Error(err));
    }
  }

  fn complete(self) {
    if self.claim() {
      self.downstream.emit(Notification::Complete);
    }
  }

  fn is_closed(&self) -> bool {
    let lost = self.state.rc_deref().winner.is_some_and(|winner| winner != self.index);
    lost || self.downstream.is_closed()
  }
}
