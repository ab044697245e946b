use crate::{
  observable::Observable,
  observer::Observer,
  ops::observer_terminal_proxy_impl,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Emits `func(v)` for every value `v` of the source.
#[derive(Clone)]
pub struct Map<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<S, F, B> Observable for Map<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> B + Send + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let func = self.func;
    self
      .source
      .actual_subscribe(subscriber.map_observer(|observer| MapObserver { observer, func }))
  }
}

impl<Item, Err, O, F, B> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  observer_terminal_proxy_impl!();
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[rxcore_macro::test]
  fn maps_values() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    from_iter(1..=3)
      .map(|v| v * 10)
      .map(|v| format!("#{v}"))
      .subscribe(move |v| c_values.lock().unwrap().push(v));

    assert_eq!(*values.lock().unwrap(), vec!["#10", "#20", "#30"]);
  }
}
