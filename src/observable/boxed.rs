//! Type erased observables.

use crate::{
  observable::Observable,
  observer::{BoxedObserver, Observer},
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Object-safe observable trait for type erasure.
pub trait DynObservable<Item, Err> {
  fn box_subscribe(self: Box<Self>, subscriber: Subscriber<BoxedObserver<Item, Err>>)
    -> Subscription;
}

impl<T, Item, Err> DynObservable<Item, Err> for T
where
  T: Observable<Item = Item, Err = Err>,
  Item: 'static,
  Err: 'static,
{
  fn box_subscribe(
    self: Box<Self>,
    subscriber: Subscriber<BoxedObserver<Item, Err>>,
  ) -> Subscription {
    (*self).actual_subscribe(subscriber)
  }
}

/// An observable whose concrete type was erased by
/// [`box_it`](crate::observable::ObservableExt::box_it).
pub struct BoxedObservable<Item, Err>(Box<dyn DynObservable<Item, Err> + Send>);

impl<Item, Err> BoxedObservable<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item = Item, Err = Err> + Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    BoxedObservable(Box::new(source))
  }
}

impl<Item: 'static, Err: 'static> Observable for BoxedObservable<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscriber = subscriber.map_observer(|o| Box::new(o) as BoxedObserver<Item, Err>);
    self.0.box_subscribe(subscriber)
  }
}
