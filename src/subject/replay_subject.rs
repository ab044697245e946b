use std::{
  collections::VecDeque,
  time::{Duration, Instant},
};

use crate::{
  error::RxError,
  observable::Observable,
  observer::{BoxedObserver, Observer},
  subscriber::Subscriber,
  subscription::Subscription,
};

use super::{impl_subject, Retained, SubjectCore};

/// History of a [`ReplaySubject`], oldest first.
pub(crate) struct History<Item> {
  capacity: usize,
  window: Option<Duration>,
  values: VecDeque<(Instant, Item)>,
}

impl<Item> History<Item> {
  fn evict(&mut self, now: Instant) {
    while self.values.len() > self.capacity {
      self.values.pop_front();
    }
    if let Some(window) = self.window {
      while self.values.front().is_some_and(|(at, _)| now.duration_since(*at) > window) {
        self.values.pop_front();
      }
    }
  }
}

impl<Item: Clone> Retained<Item> for History<Item> {
  fn record(&mut self, value: &Item) {
    let now = Instant::now();
    self.values.push_back((now, value.clone()));
    self.evict(now);
  }

  fn replay(&mut self) -> Vec<Item> {
    self.evict(Instant::now());
    self.values.iter().map(|(_, v)| v.clone()).collect()
  }

  fn replays_after_terminal(&self) -> bool { true }
}

/// A subject that replays a bounded history to every new subscriber.
///
/// At most `capacity` values are kept, the oldest is evicted first. With a
/// window, values older than the window are evicted too. A subscriber that
/// arrives after termination receives the history followed by the terminal
/// notification.
pub struct ReplaySubject<Item, Err = RxError> {
  core: SubjectCore<Item, Err, History<Item>>,
}

impl<Item, Err> ReplaySubject<Item, Err> {
  pub fn new(capacity: usize) -> Self { Self::build(capacity, None) }

  /// Keeps at most `capacity` values, none older than `window`.
  pub fn with_window(capacity: usize, window: Duration) -> Self {
    Self::build(capacity, Some(window))
  }

  pub fn unbounded() -> Self { Self::build(usize::MAX, None) }

  fn build(capacity: usize, window: Option<Duration>) -> Self {
    ReplaySubject {
      core: SubjectCore::new(History { capacity, window, values: VecDeque::new() }),
    }
  }
}

impl_subject!(ReplaySubject);
