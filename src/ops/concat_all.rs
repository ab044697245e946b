//! ConcatAll operator implementation
//!
//! Flattens an observable of observables by subscribing to the inner ones
//! strictly one after another, in the order the outer one emitted them.

use std::collections::VecDeque;

use tracing::trace;

use crate::{
  notification::Notification,
  observable::Observable,
  observer::Observer,
  ops::{subscribe_child, Downstream},
  rc::MutArc,
  serialized::Serialized,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike},
};

/// ConcatAll operator
///
/// Only one inner subscription is active at a time; inner observables
/// emitted meanwhile are queued. The result completes once the outer
/// observable completed and the last inner one completed. Any error, outer or
/// inner, is forwarded at once and cancels whatever is still running.
#[derive(Clone)]
pub struct ConcatAll<S> {
  pub(crate) source: S,
}

pub struct ConcatState<S> {
  queue: VecDeque<S>,
  /// An inner observable is running or about to be subscribed.
  active: bool,
  /// [`Chain::run`] is inside an inner subscribe call.
  subscribing: bool,
  outer_done: bool,
}

/// Everything the outer and the inner observers share.
pub struct Chain<S: Observable, O> {
  state: MutArc<ConcatState<S>>,
  downstream: Downstream<S::Item, S::Err, O>,
  parent: Subscription,
}

impl<S: Observable, O> Clone for Chain<S, O> {
  fn clone(&self) -> Self {
    Chain {
      state: self.state.clone(),
      downstream: self.downstream.clone(),
      parent: self.parent.clone(),
    }
  }
}

/// Observer of the outer observable.
pub struct ConcatOuterObserver<S: Observable, O>(Chain<S, O>);

/// Observer of the currently active inner observable.
pub struct ConcatInnerObserver<S: Observable, O>(Chain<S, O>);

impl<S> Observable for ConcatAll<S>
where
  S: Observable,
  S::Item: Observable<Err = S::Err> + Send + 'static,
  S::Err: Send + 'static,
  <S::Item as Observable>::Item: Send + 'static,
{
  type Item = <S::Item as Observable>::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let parent = subscriber.subscription().clone();
    let chain = Chain {
      state: MutArc::own(ConcatState {
        queue: VecDeque::new(),
        active: false,
        subscribing: false,
        outer_done: false,
      }),
      downstream: Serialized::new(subscriber),
      parent: parent.clone(),
    };
    subscribe_child(self.source, ConcatOuterObserver(chain), &parent);
    parent
  }
}

impl<S, O> Chain<S, O>
where
  S: Observable + Send + 'static,
  S::Item: Send + 'static,
  S::Err: Send + 'static,
  O: Observer<S::Item, S::Err> + Send + 'static,
{
  /// Subscribes `inner`, then keeps going through the queue for as long as
  /// the inner observables complete during their own subscribe call. Entered
  /// with `active` set and without the state lock.
  fn run(&self, mut inner: S) {
    loop {
      if self.parent.is_closed() {
        return;
      }
      self.state.rc_deref_mut().subscribing = true;
      trace!("concat_all subscribing next inner");
      subscribe_child(inner, ConcatInnerObserver(self.clone()), &self.parent);

      let mut state = self.state.rc_deref_mut();
      state.subscribing = false;
      if state.active {
        // still running, its completion picks up the queue
        return;
      }
      match state.queue.pop_front() {
        Some(next) => {
          state.active = true;
          inner = next;
        }
        None => {
          let done = state.outer_done;
          drop(state);
          if done {
            self.downstream.emit(Notification::Complete);
          }
          return;
        }
      }
    }
  }
}

impl<S, O> Observer<S, S::Err> for ConcatOuterObserver<S, O>
where
  S: Observable + Send + 'static,
  S::Item: Send + 'static,
  S::Err: Send + 'static,
  O: Observer<S::Item, S::Err> + Send + 'static,
{
  fn next(&mut self, inner: S) {
    {
      let mut state = self.0.state.rc_deref_mut();
      if state.active || state.subscribing {
        state.queue.push_back(inner);
        return;
      }
      state.active = true;
    }
    self.0.run(inner);
  }

  fn error(self, err: S::Err) { self.0.downstream.emit(Notification::Error(err)); }

  fn complete(self) {
    let idle = {
      let mut state = self.0.state.rc_deref_mut();
      state.outer_done = true;
      !state.active && !state.subscribing
    };
    if idle {
      self.0.downstream.emit(Notification::Complete);
    }
  }

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

impl<S, O> Observer<S::Item, S::Err> for ConcatInnerObserver<S, O>
where
  S: Observable + Send + 'static,
  S::Item: Send + 'static,
  S::Err: Send + 'static,
  O: Observer<S::Item, S::Err> + Send + 'static,
{
  fn next(&mut self, value: S::Item) { self.0.downstream.emit(Notification::Next(value)); }

  fn error(self, err: S::Err) { self.0.downstream.emit(Notification::Error(err)); }

  fn complete(self) {
    let chain = self.0;
    let mut state = chain.state.rc_deref_mut();
    state.active = false;
    if state.subscribing {
      // completed inside `run`, which moves on by itself
      return;
    }
    match state.queue.pop_front() {
      Some(next) => {
        state.active = true;
        drop(state);
        chain.run(next);
      }
      None => {
        let done = state.outer_done;
        drop(state);
        if done {
          chain.downstream.emit(Notification::Complete);
        }
      }
    }
  }

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  type Log = Arc<Mutex<Vec<Notification<i32, RxError>>>>;

  fn record(source: impl Observable<Item = i32, Err = RxError>) -> (Log, Subscription) {
    let log = Log::default();
    let c_log = log.clone();
    let subscription = source.subscribe_notification(move |n| c_log.lock().unwrap().push(n));
    (log, subscription)
  }

  fn values(log: &Log) -> Vec<i32> {
    log
      .lock()
      .unwrap()
      .iter()
      .filter_map(|n| match n {
        Notification::Next(v) => Some(*v),
        _ => None,
      })
      .collect()
  }

  #[rxcore_macro::test]
  fn runs_inners_one_after_another() {
    let mut outer = Subject::<Subject<i32>>::new();
    let mut first = Subject::<i32>::new();
    let mut second = Subject::<i32>::new();
    let (log, subscription) = record(outer.clone().concat_all());

    outer.next(first.clone());
    outer.next(second.clone());
    assert_eq!(first.observer_count(), 1);
    assert_eq!(second.observer_count(), 0);

    second.next(100);
    first.next(1);
    first.next(2);
    first.clone().complete();
    assert_eq!(second.observer_count(), 1);
    second.next(3);
    outer.clone().complete();
    assert_eq!(subscription.state(), SubscriptionState::Active);
    second.clone().complete();

    assert_eq!(values(&log), vec![1, 2, 3]);
    assert_eq!(log.lock().unwrap().last(), Some(&Notification::Complete));
    assert_eq!(subscription.state(), SubscriptionState::Completed);
  }

  #[rxcore_macro::test]
  fn synchronous_inners() {
    let (log, _) = record(from_iter([from_iter(1..=2), from_iter(3..=4)]).concat_all());
    assert_eq!(values(&log), vec![1, 2, 3, 4]);
    assert_eq!(log.lock().unwrap().last(), Some(&Notification::Complete));
  }

  #[rxcore_macro::test]
  fn inner_error_cancels_outer() {
    let mut outer = Subject::<Subject<i32>>::new();
    let inner = Subject::<i32>::new();
    let (log, subscription) = record(outer.clone().concat_all());

    outer.next(inner.clone());
    inner.clone().error(RxError::custom("inner"));

    assert_eq!(*log.lock().unwrap(), vec![Notification::Error(RxError::custom("inner"))]);
    assert_eq!(subscription.state(), SubscriptionState::Errored);
    assert_eq!(outer.observer_count(), 0);
  }

  #[rxcore_macro::test]
  fn outer_error_cancels_active_inner() {
    let mut outer = Subject::<Subject<i32>>::new();
    let inner = Subject::<i32>::new();
    let (log, _) = record(outer.clone().concat_all());

    outer.next(inner.clone());
    outer.clone().error(RxError::custom("outer"));

    assert_eq!(*log.lock().unwrap(), vec![Notification::Error(RxError::custom("outer"))]);
    assert_eq!(inner.observer_count(), 0);
  }

  #[rxcore_macro::test]
  fn long_queue_of_synchronous_inners() {
    let pending = Subject::<i32>::new();
    let c_pending = pending.clone();
    let (log, subscription) = record(
      create(move |emitter: &mut dyn Emitter<BoxedObservable<i32, RxError>, RxError>| {
        emitter.next(c_pending.box_it());
        for i in 0..10_000 {
          emitter.next(of(i).box_it());
        }
        emitter.complete();
      })
      .concat_all(),
    );
    assert!(log.lock().unwrap().is_empty());

    pending.clone().complete();

    assert_eq!(values(&log), (0..10_000).collect::<Vec<_>>());
    assert_eq!(log.lock().unwrap().last(), Some(&Notification::Complete));
    assert_eq!(subscription.state(), SubscriptionState::Completed);
  }

  #[rxcore_macro::test]
  fn observer_may_feed_the_active_inner() {
    let mut outer = Subject::<Subject<i32>>::new();
    let inner = Subject::<i32>::new();
    let mut c_inner = inner.clone();
    let log = Log::default();
    let c_log = log.clone();
    outer.clone().concat_all().subscribe_notification(move |n| {
      if n == Notification::Next(1) {
        c_inner.next(2);
        c_inner.clone().complete();
      }
      c_log.lock().unwrap().push(n);
    });

    outer.next(inner.clone());
    outer.clone().complete();
    inner.clone().next(1);

    assert_eq!(
      *log.lock().unwrap(),
      vec![Notification::Next(1), Notification::Next(2), Notification::Complete]
    );
  }

  #[rxcore_macro::test]
  fn empty_outer_completes() {
    let (log, _) = record(empty::<Subject<i32>>().concat_all());
    assert_eq!(*log.lock().unwrap(), vec![Notification::Complete]);
  }
}
