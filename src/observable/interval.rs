use std::{marker::PhantomData, time::Duration};

use crate::{
  error::RxError, observable::Observable, observer::Observer, scheduler::Scheduler,
  subscriber::Subscriber, subscription::Subscription,
};

/// Creates an observable which emits `0, 1, 2, ...`, one value every `period`,
/// starting one `period` after subscription. Never completes on its own.
pub fn interval<SD: Scheduler>(period: Duration, scheduler: SD) -> Interval<SD, RxError> {
  Interval { period, delay: period, once: false, scheduler, _err: PhantomData }
}

/// Creates an observable which emits `0` after `delay`, then completes.
pub fn timer<SD: Scheduler>(delay: Duration, scheduler: SD) -> Interval<SD, RxError> {
  Interval { period: delay, delay, once: true, scheduler, _err: PhantomData }
}

#[derive(Clone)]
pub struct Interval<SD, Err> {
  period: Duration,
  delay: Duration,
  once: bool,
  scheduler: SD,
  _err: PhantomData<fn() -> Err>,
}

impl<SD, Err> Interval<SD, Err> {
  /// Fires the first value after `delay` instead of after one period.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

impl<SD, Err> Observable for Interval<SD, Err>
where
  SD: Scheduler,
  Err: 'static,
{
  type Item = usize;
  type Err = Err;

  fn actual_subscribe<O>(self, mut subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let Self { period, delay, once, scheduler, .. } = self;
    let subscription = subscriber.subscription().clone();
    let timer = scheduler.clone();
    let handle = scheduler.spawn(async move {
      timer.sleep(delay).await;
      let mut seq = 0;
      loop {
        if subscriber.is_closed() {
          return;
        }
        subscriber.next(seq);
        if once {
          subscriber.complete();
          return;
        }
        seq += 1;
        timer.sleep(period).await;
      }
    });
    subscription.add(handle);
    subscription
  }
}
