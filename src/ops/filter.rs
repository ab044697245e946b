use crate::{
  observable::Observable,
  observer::Observer,
  ops::observer_terminal_proxy_impl,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Emits only the values for which `func` returns `true`.
#[derive(Clone)]
pub struct Filter<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

pub struct FilterObserver<O, F> {
  observer: O,
  func: F,
}

impl<S, F> Observable for Filter<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool + Send + 'static,
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
      .actual_subscribe(subscriber.map_observer(|observer| FilterObserver { observer, func }))
  }
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.func)(&value) {
      self.observer.next(value)
    }
  }

  observer_terminal_proxy_impl!();
}
