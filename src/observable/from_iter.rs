use std::marker::PhantomData;

use crate::{
  error::RxError, observable::Observable, observer::Observer, subscriber::Subscriber,
  subscription::Subscription,
};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Stops early when the
/// subscriber is closed, e.g. by a downstream `take`.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> FromIter<Iter::IntoIter, RxError>
where
  Iter: IntoIterator,
{
  FromIter(iter.into_iter(), PhantomData)
}

#[derive(Clone)]
pub struct FromIter<Iter, Err>(Iter, PhantomData<fn() -> Err>);

impl<Iter, Err> Observable for FromIter<Iter, Err>
where
  Iter: Iterator,
{
  type Item = Iter::Item;
  type Err = Err;

  fn actual_subscribe<O>(self, mut subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription().clone();
    for v in self.0 {
      if subscriber.is_closed() {
        return subscription;
      }
      subscriber.next(v);
    }
    subscriber.complete();
    subscription
  }
}
