use std::marker::PhantomData;

use crate::{
  error::RxError,
  observable::Observable,
  observer::{Emitter, Observer},
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Creates an observable from a producer closure.
///
/// The closure runs once per subscription and pushes notifications through
/// the [`Emitter`] it receives. Whatever it emits after a terminal
/// notification, or after the subscription was cancelled, is dropped.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// create(|emitter: &mut dyn Emitter<i32, RxError>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
/// })
/// .subscribe(|v| println!("{v}"));
/// ```
pub fn create<F, Item>(producer: F) -> Create<F, Item, RxError>
where
  F: FnOnce(&mut dyn Emitter<Item, RxError>),
{
  Create(producer, PhantomData)
}

#[derive(Clone)]
pub struct Create<F, Item, Err>(F, PhantomData<fn() -> (Item, Err)>);

impl<F, Item, Err> Create<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>),
{
  /// Same as [`create`] with a caller chosen error type.
  pub fn new(producer: F) -> Self { Create(producer, PhantomData) }
}

struct SubscriberEmitter<O>(Option<Subscriber<O>>);

impl<Item, Err, O> Emitter<Item, Err> for SubscriberEmitter<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(subscriber) = self.0.as_mut() {
      subscriber.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if let Some(subscriber) = self.0.take() {
      subscriber.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(subscriber) = self.0.take() {
      subscriber.complete();
    }
  }

  fn is_closed(&self) -> bool { self.0.as_ref().map_or(true, Observer::<Item, Err>::is_closed) }
}

impl<F, Item, Err> Observable for Create<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>),
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription().clone();
    let mut emitter = SubscriberEmitter(Some(subscriber));
    (self.0)(&mut emitter);
    subscription
  }
}
