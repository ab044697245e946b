//! Operators.
//!
//! The per-element operators (`map`, `filter`, `take`, `tap`,
//! `subscribe_on`) are plain users of the observer contract. The windowed
//! buffers and the multi-source combinators own shared state and follow one
//! discipline: each upstream gets a child [`Subscription`] registered on the
//! downstream one, the join state is only touched under its lock, and the
//! downstream [`Subscriber`] is reached through a [`Downstream`] gate that is
//! drained after that lock is released.

use crate::{
  observable::Observable,
  observer::Observer,
  serialized::Serialized,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike},
};

pub mod buffer_count;
pub mod buffer_time;
pub mod combine_latest;
pub mod concat_all;
pub mod filter;
pub mod fork_join;
pub mod map;
pub mod merge;
pub mod race;
pub mod subscribe_on;
pub mod take;
pub mod tap;
pub mod zip;

pub use combine_latest::combine_latest;
pub use fork_join::fork_join;
pub use merge::merge;
pub use race::race;
pub use zip::zip;

/// Forwards `error` and `complete` to the `observer` field unchanged.
macro_rules! observer_terminal_proxy_impl {
  () => {
    #[inline]
    fn error(self, err: Err) { self.observer.error(err) }

    #[inline]
    fn complete(self) { self.observer.complete() }

    #[inline]
    fn is_closed(&self) -> bool { self.observer.is_closed() }
  };
}

pub(crate) use observer_terminal_proxy_impl;

/// The serialized downstream of a shared-state operator.
pub type Downstream<Item, Err, O> = Serialized<Item, Err, Subscriber<O>>;

/// Subscribes `source` with a fresh child of `parent`.
pub(crate) fn subscribe_child<S, O>(source: S, observer: O, parent: &Subscription)
where
  S: Observable,
  O: Observer<S::Item, S::Err> + Send + 'static,
{
  let child = Subscription::new();
  parent.add(child.clone());
  source.actual_subscribe(Subscriber::with_subscription(observer, child));
}

/// Subscribes every input in index order, each with its own child of
/// `parent`, and stops early once `parent` is closed.
pub(crate) fn subscribe_inputs<S, O>(
  sources: Vec<S>,
  parent: &Subscription,
  mut observer: impl FnMut(usize) -> O,
) where
  S: Observable,
  O: Observer<S::Item, S::Err> + Send + 'static,
{
  for (index, source) in sources.into_iter().enumerate() {
    if parent.is_closed() {
      break;
    }
    subscribe_child(source, observer(index), parent);
  }
}
