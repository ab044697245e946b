//! The producer side of the contract, its sources, and the pipeline methods.

use std::time::Duration;

use crate::{
  notification::Notification,
  observer::{NotificationObserver, Observer, ObserverAll},
  ops::{
    buffer_count::BufferWithCount, buffer_time::BufferWithTime, combine_latest::CombineLatest,
    concat_all::ConcatAll, filter::Filter, fork_join::ForkJoin, map::Map, merge::Merge,
    race::Race, subscribe_on::SubscribeOn, take::Take, tap::Tap, zip::Zip, zip::ZipAll,
  },
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::Subscription,
};

mod boxed;
mod connectable;
mod create;
mod from_iter;
mod interval;
mod of;
mod trivial;

pub use boxed::*;
pub use connectable::*;
pub use create::*;
pub use from_iter::*;
pub use interval::*;
pub use of::*;
pub use trivial::*;

/// A factory of subscriptions.
///
/// Every call to [`actual_subscribe`](Observable::actual_subscribe) starts an
/// independent production for the given subscriber unless the implementor
/// multicasts (subjects). The implementor must deliver `next` zero or more
/// times followed by at most one terminal notification, and stop as soon as
/// the subscriber reports itself closed.
pub trait Observable: Sized {
  type Item;
  type Err;

  /// Starts production into `subscriber` and returns the subscription that
  /// cancels it. Implementations return (a clone of) the subscriber's own
  /// subscription.
  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static;
}

/// Left to right pipeline over any [`Observable`].
pub trait ObservableExt: Observable {
  /// Subscribes an observer and returns the handle that cancels it.
  fn subscribe_with<O>(self, observer: O) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    self.actual_subscribe(Subscriber::new(observer))
  }

  /// Invokes `next` for every value. Errors and completion are ignored.
  fn subscribe<N>(self, next: N) -> Subscription
  where
    N: FnMut(Self::Item) + Send + 'static,
  {
    self.subscribe_with(ObserverAll::new(next, |_: Self::Err| {}, || {}))
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> Subscription
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnOnce(Self::Err) + Send + 'static,
  {
    self.subscribe_with(ObserverAll::new(next, error, || {}))
  }

  fn subscribe_complete<N, C>(self, next: N, complete: C) -> Subscription
  where
    N: FnMut(Self::Item) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    self.subscribe_with(ObserverAll::new(next, |_: Self::Err| {}, complete))
  }

  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnOnce(Self::Err) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    self.subscribe_with(ObserverAll::new(next, error, complete))
  }

  /// Receives every event as a [`Notification`].
  fn subscribe_notification<F>(self, f: F) -> Subscription
  where
    F: FnMut(Notification<Self::Item, Self::Err>) + Send + 'static,
  {
    self.subscribe_with(NotificationObserver(f))
  }

  /// Applies `f` to the whole observable, so user defined operators read like
  /// built-in ones.
  fn pipe<R, F>(self, f: F) -> R
  where
    F: FnOnce(Self) -> R,
  {
    f(self)
  }

  /// Erases the concrete type, so observables built differently can be
  /// combined.
  fn box_it(self) -> BoxedObservable<Self::Item, Self::Err>
  where
    Self: Send + 'static,
    Self::Item: 'static,
    Self::Err: 'static,
  {
    BoxedObservable::new(self)
  }

  fn map<B, F>(self, f: F) -> Map<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    Map { source: self, func: f }
  }

  fn filter<F>(self, f: F) -> Filter<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    Filter { source: self, func: f }
  }

  /// Emits only the first `count` values, then completes and cancels the
  /// source.
  fn take(self, count: usize) -> Take<Self> { Take { source: self, count } }

  /// Runs `f` on every value before passing it on.
  fn tap<F>(self, f: F) -> Tap<Self, F>
  where
    F: FnMut(&Self::Item),
  {
    Tap { source: self, func: f }
  }

  /// Subscribes to the source from a task spawned on `scheduler`.
  fn subscribe_on<SD: Scheduler>(self, scheduler: SD) -> SubscribeOn<Self, SD> {
    SubscribeOn { source: self, scheduler }
  }

  /// Opens a window every `skip` values and emits it once it holds `count`
  /// values. See [`BufferWithCount`].
  fn buffer_with_count(self, count: usize, skip: usize) -> BufferWithCount<Self> {
    BufferWithCount { source: self, count, skip }
  }

  /// Emits the collected values every `timespan`. A non-zero `timeshift`
  /// pauses collection after each emission. See [`BufferWithTime`].
  fn buffer_with_time<SD: Scheduler>(
    self,
    timespan: Duration,
    timeshift: Duration,
    scheduler: SD,
  ) -> BufferWithTime<Self, SD> {
    BufferWithTime::with_time(self, timespan, timeshift, scheduler)
  }

  /// Emits the collected values every `timespan` or as soon as `count` values
  /// are collected, whichever comes first.
  fn buffer_with_time_or_count<SD: Scheduler>(
    self,
    timespan: Duration,
    count: usize,
    scheduler: SD,
  ) -> BufferWithTime<Self, SD> {
    BufferWithTime::with_time_or_count(self, timespan, count, scheduler)
  }

  /// Pairs values by index across `self` and `others`.
  fn zip_with<I>(self, others: I) -> Zip<Self>
  where
    I: IntoIterator<Item = Self>,
  {
    Zip::new(std::iter::once(self).chain(others))
  }

  /// Collects the inner observables until `self` completes, then zips them.
  fn zip_all(self) -> ZipAll<Self>
  where
    Self::Item: Observable<Err = Self::Err>,
  {
    ZipAll { source: self }
  }

  fn combine_latest_with<I>(self, others: I) -> CombineLatest<Self>
  where
    I: IntoIterator<Item = Self>,
  {
    CombineLatest::new(std::iter::once(self).chain(others))
  }

  fn merge_with<I>(self, others: I) -> Merge<Self>
  where
    I: IntoIterator<Item = Self>,
  {
    Merge::new(std::iter::once(self).chain(others))
  }

  fn race_with<I>(self, others: I) -> Race<Self>
  where
    I: IntoIterator<Item = Self>,
  {
    Race::new(std::iter::once(self).chain(others))
  }

  fn fork_join_with<I>(self, others: I) -> ForkJoin<Self>
  where
    I: IntoIterator<Item = Self>,
  {
    ForkJoin::new(std::iter::once(self).chain(others))
  }

  /// Subscribes to the inner observables one after another.
  fn concat_all(self) -> ConcatAll<Self>
  where
    Self::Item: Observable<Err = Self::Err>,
  {
    ConcatAll { source: self }
  }

  /// Shares one execution of `self` among every observer registered before
  /// [`ConnectableObservable::connect`] is called.
  fn publish(self) -> ConnectableObservable<Self> { ConnectableObservable::new(self) }
}

impl<T: Observable> ObservableExt for T {}
