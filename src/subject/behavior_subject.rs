use crate::{
  error::RxError,
  observable::Observable,
  observer::{BoxedObserver, Observer},
  subscriber::Subscriber,
  subscription::Subscription,
};

use super::{impl_subject, Retained, SubjectCore};

/// Latest value of a [`BehaviorSubject`].
pub(crate) struct Current<Item>(Item);

impl<Item: Clone> Retained<Item> for Current<Item> {
  fn record(&mut self, value: &Item) { self.0 = value.clone(); }

  fn replay(&mut self) -> Vec<Item> { vec![self.0.clone()] }
}

/// A subject that always holds a current value.
///
/// Every new subscriber first receives the current value, then whatever is
/// emitted afterwards. `Default` seeds it with `Item::default()`.
pub struct BehaviorSubject<Item, Err = RxError> {
  core: SubjectCore<Item, Err, Current<Item>>,
}

impl<Item, Err> BehaviorSubject<Item, Err> {
  pub fn new(seed: Item) -> Self { BehaviorSubject { core: SubjectCore::new(Current(seed)) } }

  /// The latest value accepted before the subject terminated, or the seed.
  pub fn value(&self) -> Item
  where
    Item: Clone,
  {
    self.core.with_retained(|current| current.0.clone())
  }
}

impl<Item: Default, Err> Default for BehaviorSubject<Item, Err> {
  fn default() -> Self { Self::new(Item::default()) }
}

impl_subject!(BehaviorSubject);
