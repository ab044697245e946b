use crate::{
  observer::Observer,
  subscription::{release, Subscription, SubscriptionLike, SubscriptionState},
};

/// An observer paired with the subscription it feeds.
///
/// This is what sources and multi-source operators drive. It enforces the
/// observer contract for whatever it wraps: values are dropped once the
/// subscription is closed, and a terminal notification first moves the
/// subscription into `Completed`/`Errored`, then reaches the observer, then
/// releases every resource the subscription owned. Only the first terminal
/// notification gets through, no matter how many producers race for it.
pub struct Subscriber<O> {
  observer: O,
  subscription: Subscription,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self { Subscriber { observer, subscription: Subscription::new() } }

  pub fn with_subscription(observer: O, subscription: Subscription) -> Self {
    Subscriber { observer, subscription }
  }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.subscription }

  pub fn into_parts(self) -> (O, Subscription) { (self.observer, self.subscription) }

  /// Swaps the observer while keeping the subscription.
  pub fn map_observer<B>(self, f: impl FnOnce(O) -> B) -> Subscriber<B> {
    Subscriber { observer: f(self.observer), subscription: self.subscription }
  }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.subscription.is_closed() {
      self.observer.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(teardown) = self.subscription.finish(SubscriptionState::Errored) {
      self.observer.error(err);
      release(teardown);
    }
  }

  fn complete(self) {
    if let Some(teardown) = self.subscription.finish(SubscriptionState::Completed) {
      self.observer.complete();
      release(teardown);
    }
  }

  fn is_closed(&self) -> bool { self.subscription.is_closed() || self.observer.is_closed() }
}
