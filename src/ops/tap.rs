use crate::{
  observable::Observable,
  observer::Observer,
  ops::observer_terminal_proxy_impl,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Runs a side effect for every value and passes the value on unchanged.
#[derive(Clone)]
pub struct Tap<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<S, F> Observable for Tap<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) + Send + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let func = self.func;
    self
      .source
      .actual_subscribe(subscriber.map_observer(|observer| TapObserver { observer, func }))
  }
}

impl<Item, Err, O, F> Observer<Item, Err> for TapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value)
  }

  observer_terminal_proxy_impl!();
}
