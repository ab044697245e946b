use std::marker::PhantomData;

use crate::{
  error::RxError, observable::Observable, observer::Observer, subscriber::Subscriber,
  subscription::Subscription,
};

/// Creates an observable that emits no values and completes immediately.
pub fn empty<Item>() -> Empty<Item, RxError> { Empty(PhantomData) }

/// Creates an observable that never emits and never terminates.
pub fn never<Item>() -> Never<Item, RxError> { Never(PhantomData) }

/// Creates an observable that emits no values and terminates with `err`.
pub fn throw_err<Item, Err>(err: Err) -> ThrowErr<Item, Err> { ThrowErr(err, PhantomData) }

#[derive(Clone)]
pub struct Empty<Item, Err>(PhantomData<fn() -> (Item, Err)>);

#[derive(Clone)]
pub struct Never<Item, Err>(PhantomData<fn() -> (Item, Err)>);

#[derive(Clone)]
pub struct ThrowErr<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err> Observable for Empty<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription().clone();
    subscriber.complete();
    subscription
  }
}

impl<Item, Err> Observable for Never<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    subscriber.subscription().clone()
  }
}

impl<Item, Err> Observable for ThrowErr<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription().clone();
    subscriber.error(self.0);
    subscription
  }
}
