//! BufferWithCount operator implementation.

use std::collections::VecDeque;

use tracing::warn;

use crate::{
  error::RxError, observable::Observable, observer::Observer, subscriber::Subscriber,
  subscription::Subscription,
};

/// BufferWithCount operator.
///
/// Opens a new window every `skip` values and emits a window as soon as it
/// holds `count` values:
///
/// - `skip == count`: consecutive, disjoint windows
/// - `skip < count`: overlapping windows
/// - `skip > count`: values between two windows are dropped
///
/// When the source completes, every open non-empty window is emitted, oldest
/// first, before completing. On error the open windows are flushed the same
/// way, then the error is forwarded. A zero `count` or `skip` is rejected with
/// an [`RxError::IllegalInput`] error at subscription.
#[derive(Clone)]
pub struct BufferWithCount<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
  pub(crate) skip: usize,
}

/// Observer for BufferWithCount.
pub struct BufferWithCountObserver<O, Item> {
  observer: O,
  windows: VecDeque<Vec<Item>>,
  count: usize,
  skip: usize,
  seen: usize,
}

impl<O, Item> BufferWithCountObserver<O, Item> {
  fn flush<Err>(&mut self)
  where
    O: Observer<Vec<Item>, Err>,
  {
    for window in self.windows.drain(..) {
      if !window.is_empty() {
        self.observer.next(window);
      }
    }
  }
}

impl<O, Item, Err> Observer<Item, Err> for BufferWithCountObserver<O, Item>
where
  O: Observer<Vec<Item>, Err>,
  Item: Clone,
{
  fn next(&mut self, value: Item) {
    if self.seen % self.skip == 0 {
      self.windows.push_back(Vec::with_capacity(self.count));
    }
    self.seen += 1;

    if let Some((last, rest)) = self.windows.make_contiguous().split_last_mut() {
      for window in rest {
        window.push(value.clone());
      }
      last.push(value);
    }

    // windows are opened in order, so only the oldest can be full
    while self.windows.front().is_some_and(|w| w.len() >= self.count) {
      if let Some(window) = self.windows.pop_front() {
        self.observer.next(window);
      }
    }
  }

  fn error(mut self, err: Err) {
    self.flush::<Err>();
    self.observer.error(err);
  }

  fn complete(mut self) {
    self.flush::<Err>();
    self.observer.complete();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<S> Observable for BufferWithCount<S>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
  S::Err: From<RxError>,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let BufferWithCount { source, count, skip } = self;
    let invalid = match (count, skip) {
      (0, _) => Some("count must be positive"),
      (_, 0) => Some("skip must be positive"),
      _ => None,
    };
    if let Some(msg) = invalid {
      warn!(count, skip, "buffer_with_count rejected: {msg}");
      let subscription = subscriber.subscription().clone();
      subscriber.error(RxError::illegal_input(msg).into());
      return subscription;
    }

    source.actual_subscribe(subscriber.map_observer(|observer| BufferWithCountObserver {
      observer,
      windows: VecDeque::new(),
      count,
      skip,
      seen: 0,
    }))
  }
}
