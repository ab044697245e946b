//! Multicasting one source execution through a [`Subject`].

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subject::Subject,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// A source paired with the subject that will multicast it.
///
/// Subscribing (directly or through [`fork`](Self::fork)) only registers with
/// the subject. Nothing is produced until [`connect`](Self::connect)
/// subscribes the subject to the source; every observer registered by then
/// sees the same values. Observers arriving later only see what is emitted
/// after they register.
pub struct ConnectableObservable<S: Observable> {
  source: S,
  subject: Subject<S::Item, S::Err>,
}

impl<S: Observable> ConnectableObservable<S> {
  pub fn new(source: S) -> Self { ConnectableObservable { source, subject: Subject::new() } }

  /// An observable over the shared subject.
  pub fn fork(&self) -> Subject<S::Item, S::Err> { self.subject.clone() }

  /// Starts the source. Unsubscribing the returned handle stops it for every
  /// forked observer at once.
  pub fn connect(self) -> Subscription
  where
    S::Item: Clone + Send + 'static,
    S::Err: Clone + Send + 'static,
  {
    self.source.subscribe_with(self.subject)
  }
}

impl<S> Observable for ConnectableObservable<S>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
  S::Err: Clone + Send + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    self.subject.actual_subscribe(subscriber)
  }
}
