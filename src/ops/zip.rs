//! Zip operator implementation
//!
//! Zip pairs values by index across any number of inputs. Every input owns a
//! FIFO queue; as soon as each queue holds a value, one value is popped from
//! every queue and emitted as a `Vec` in input order.

use std::collections::VecDeque;

use tracing::debug;

use crate::{
  notification::Notification,
  observable::Observable,
  observer::Observer,
  ops::{subscribe_child, subscribe_inputs, Downstream},
  rc::MutArc,
  serialized::Serialized,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Zip operator
///
/// Completes once an input has completed and its queue is drained, since no
/// further tuple can be formed; values still queued for other inputs are
/// discarded. The first error from any input is forwarded at once and cancels
/// all other inputs. Zipping zero inputs completes immediately.
#[derive(Clone)]
pub struct Zip<S> {
  sources: Vec<S>,
}

impl<S> Zip<S> {
  pub fn new(sources: impl IntoIterator<Item = S>) -> Self {
    Zip { sources: sources.into_iter().collect() }
  }
}

/// Zips all `sources` together, see [`Zip`].
pub fn zip<S: Observable>(sources: impl IntoIterator<Item = S>) -> Zip<S> { Zip::new(sources) }

// ==================== Shared State ====================

pub struct ZipState<Item> {
  queues: Vec<VecDeque<Item>>,
  completed: Vec<bool>,
}

impl<Item> ZipState<Item> {
  /// An input that completed with nothing queued can never contribute again.
  fn exhausted(&self) -> bool {
    self.completed.iter().zip(&self.queues).any(|(done, queue)| *done && queue.is_empty())
  }

  fn ready(&self) -> bool { self.queues.iter().all(|q| !q.is_empty()) }
}

/// Observer for the input at `index`.
pub struct ZipObserver<Item, Err, O> {
  state: MutArc<ZipState<Item>>,
  downstream: Downstream<Vec<Item>, Err, O>,
  index: usize,
}

impl<S> Observable for Zip<S>
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

    let state = MutArc::own(ZipState {
      queues: (0..len).map(|_| VecDeque::new()).collect(),
      completed: vec![false; len],
    });
    let downstream = Serialized::new(subscriber);
    subscribe_inputs(self.sources, &parent, |index| ZipObserver {
      state: state.clone(),
      downstream: downstream.clone(),
      index,
    });
    parent
  }
}

impl<Item, Err, O> Observer<Item, Err> for ZipObserver<Item, Err, O>
where
  O: Observer<Vec<Item>, Err>,
{
  fn next(&mut self, value: Item) {
    {
      let mut state = self.state.rc_deref_mut();
      if self.downstream.is_closed() {
        return;
      }
      state.queues[self.index].push_back(value);
      if state.ready() {
        let tuple: Vec<Item> = state.queues.iter_mut().filter_map(VecDeque::pop_front).collect();
        self.downstream.push(Notification::Next(tuple));
        if state.exhausted() {
          self.downstream.push(Notification::Complete);
        }
      }
    }
    self.downstream.drain();
  }

  fn error(self, err: Err) {
    if self.downstream.push(Notification::Error(err)) {
      debug!(input = self.index, "zip input errored, cancelling the others");
    }
    self.downstream.drain();
  }

  fn complete(self) {
    {
      let mut state = self.state.rc_deref_mut();
      state.completed[self.index] = true;
      if state.exhausted() {
        self.downstream.push(Notification::Complete);
      }
    }
    self.downstream.drain();
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

// ==================== ZipAll ====================

/// Collects the inner observables of an observable of observables and zips
/// them once the outer one completes. An outer error is forwarded at once.
#[derive(Clone)]
pub struct ZipAll<S> {
  pub(crate) source: S,
}

pub struct ZipAllObserver<O, S> {
  subscriber: Option<Subscriber<O>>,
  sources: Vec<S>,
}

impl<S> Observable for ZipAll<S>
where
  S: Observable,
  S::Item: Observable<Err = S::Err> + Send + 'static,
  S::Err: Send + 'static,
  <S::Item as Observable>::Item: Send + 'static,
{
  type Item = Vec<<S::Item as Observable>::Item>;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let parent = subscriber.subscription().clone();
    let observer = ZipAllObserver { subscriber: Some(subscriber), sources: Vec::new() };
    subscribe_child(self.source, observer, &parent);
    parent
  }
}

impl<O, S, Err> Observer<S, Err> for ZipAllObserver<O, S>
where
  S: Observable<Err = Err>,
  S::Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Vec<S::Item>, Err> + Send + 'static,
{
  fn next(&mut self, value: S) { self.sources.push(value) }

  fn error(self, err: Err) { self.subscriber.error(err) }

  fn complete(self) {
    if let Some(subscriber) = self.subscriber {
      Zip::new(self.sources).actual_subscribe(subscriber);
    }
  }

  fn is_closed(&self) -> bool { self.subscriber.is_closed() }
}
