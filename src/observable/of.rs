use std::marker::PhantomData;

use crate::{
  error::RxError, observable::Observable, observer::Observer, subscriber::Subscriber,
  subscription::Subscription,
};

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// of(123).subscribe(|v| println!("{},", v));
/// ```
pub fn of<Item>(v: Item) -> Of<Item, RxError> { Of(v, PhantomData) }

#[derive(Clone)]
pub struct Of<Item, Err>(Item, PhantomData<fn() -> Err>);

impl<Item, Err> Observable for Of<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, mut subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription().clone();
    subscriber.next(self.0);
    subscriber.complete();
    subscription
  }
}
