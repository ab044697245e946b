use crate::{
  observable::Observable,
  observer::Observer,
  ops::subscribe_child,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Emits only the first `count` values emitted by the source, then completes
/// and cancels the source. If the source emits fewer values, all of them are
/// emitted followed by the source's own terminal notification.
#[derive(Clone)]
pub struct Take<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

pub struct TakeObserver<O> {
  subscriber: Option<Subscriber<O>>,
  remaining: usize,
}

impl<S> Observable for Take<S>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let parent = subscriber.subscription().clone();
    if self.count == 0 {
      subscriber.complete();
      return parent;
    }
    let observer = TakeObserver { subscriber: Some(subscriber), remaining: self.count };
    subscribe_child(self.source, observer, &parent);
    parent
  }
}

impl<Item, Err, O> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(subscriber) = self.subscriber.as_mut() {
      subscriber.next(value);
      self.remaining -= 1;
      if self.remaining == 0 {
        self.subscriber.take().complete();
      }
    }
  }

  fn error(self, err: Err) { self.subscriber.error(err) }

  fn complete(self) { self.subscriber.complete() }

  fn is_closed(&self) -> bool { self.subscriber.is_closed() }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[rxcore_macro::test]
  fn takes_first_values_then_completes() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    let subscription =
      from_iter(0..100).take(2).subscribe_notification(move |n| c_log.lock().unwrap().push(n));

    assert_eq!(
      *log.lock().unwrap(),
      vec![Notification::Next(0), Notification::Next(1), Notification::Complete]
    );
    assert_eq!(subscription.state(), SubscriptionState::Completed);
  }

  #[rxcore_macro::test]
  fn shorter_source() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    from_iter(0..1).take(5).subscribe_notification(move |n| c_log.lock().unwrap().push(n));

    assert_eq!(*log.lock().unwrap(), vec![Notification::Next(0), Notification::Complete]);
  }

  #[rxcore_macro::test]
  fn take_zero_completes_without_subscribing() {
    let mut subject = Subject::<i32>::new();
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    subject.clone().take(0).subscribe_notification(move |n| c_log.lock().unwrap().push(n));
    subject.next(1);

    assert_eq!(subject.observer_count(), 0);
    assert_eq!(*log.lock().unwrap(), vec![Notification::Complete]);
  }
}
