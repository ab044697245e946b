//! Subjects: observables that are observers at the same time.
//!
//! A subject multicasts every notification it receives to the observers
//! registered at that moment, in registration order. The three flavors differ
//! only in what they retain for observers that arrive later:
//!
//! | Type | Retains | Late subscriber receives |
//! |------|---------|--------------------------|
//! | [`Subject`] | nothing | live values only |
//! | [`BehaviorSubject`] | latest value | latest value, then live values |
//! | [`ReplaySubject`] | bounded history | history, then live values |
//!
//! Once terminated a subject ignores every further call. Subscribing to a
//! terminated `Subject` or `BehaviorSubject` yields a subscription that is
//! already `Completed`/`Errored` and delivers nothing; a `ReplaySubject` still
//! replays its history followed by the terminal notification.
//!
//! An observer may call back into the subject that is feeding it: whatever
//! it emits is queued and delivered after the current notification.

use tracing::debug;

use crate::{
  error::RxError,
  notification::Notification,
  observable::Observable,
  observer::{BoxedObserver, Observer},
  rc::MutArc,
  serialized::Serialized,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionState},
};

mod behavior_subject;
mod replay_subject;
mod subscribers;

pub use behavior_subject::BehaviorSubject;
pub use replay_subject::ReplaySubject;
use subscribers::{deliver, Subscribers};

#[derive(Clone)]
enum Terminal<Err> {
  Completed,
  Errored(Err),
}

impl<Err> Terminal<Err> {
  fn state(&self) -> SubscriptionState {
    match self {
      Terminal::Completed => SubscriptionState::Completed,
      Terminal::Errored(_) => SubscriptionState::Errored,
    }
  }

  fn into_notification<Item>(self) -> Notification<Item, Err> {
    match self {
      Terminal::Completed => Notification::Complete,
      Terminal::Errored(err) => Notification::Error(err),
    }
  }
}

/// What a subject keeps for observers that subscribe later.
pub(crate) trait Retained<Item> {
  fn record(&mut self, value: &Item);

  /// Values a new subscriber receives before anything live.
  fn replay(&mut self) -> Vec<Item>;

  fn replays_after_terminal(&self) -> bool { false }
}

impl<Item> Retained<Item> for () {
  #[inline]
  fn record(&mut self, _: &Item) {}

  #[inline]
  fn replay(&mut self) -> Vec<Item> { Vec::new() }
}

struct CoreState<Item, Err, R> {
  terminal: Option<Terminal<Err>>,
  subscribers: Subscribers<Item, Err>,
  retained: R,
}

/// State machine shared by all subject flavors. Registry and retained state
/// are only touched under the core lock; observers are only called without
/// it.
pub(crate) struct SubjectCore<Item, Err, R>(MutArc<CoreState<Item, Err, R>>);

impl<Item, Err, R> Clone for SubjectCore<Item, Err, R> {
  fn clone(&self) -> Self { SubjectCore(self.0.clone()) }
}

impl<Item, Err, R> SubjectCore<Item, Err, R> {
  pub(crate) fn new(retained: R) -> Self {
    SubjectCore(MutArc::own(CoreState {
      terminal: None,
      subscribers: Subscribers::default(),
      retained,
    }))
  }

  pub(crate) fn is_closed(&self) -> bool { self.0.rc_deref().terminal.is_some() }

  pub(crate) fn observer_count(&self) -> usize { self.0.rc_deref().subscribers.len() }

  pub(crate) fn with_retained<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
    f(&mut self.0.rc_deref_mut().retained)
  }
}

impl<Item, Err, R> SubjectCore<Item, Err, R>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  R: Retained<Item> + Send + 'static,
{
  pub(crate) fn emit_next(&self, value: Item) {
    let entries = {
      let mut core = self.0.rc_deref_mut();
      if core.terminal.is_some() {
        return;
      }
      core.retained.record(&value);
      core.subscribers.queue_value(value)
    };
    deliver(entries);
  }

  pub(crate) fn emit_error(&self, err: Err) {
    let entries = {
      let mut core = self.0.rc_deref_mut();
      if core.terminal.is_some() {
        return;
      }
      core.terminal = Some(Terminal::Errored(err.clone()));
      core.subscribers.queue_terminal(Notification::Error(err))
    };
    debug!(observers = entries.len(), "subject errored");
    deliver(entries);
  }

  pub(crate) fn emit_complete(&self) {
    let entries = {
      let mut core = self.0.rc_deref_mut();
      if core.terminal.is_some() {
        return;
      }
      core.terminal = Some(Terminal::Completed);
      core.subscribers.queue_terminal(Notification::Complete)
    };
    debug!(observers = entries.len(), "subject completed");
    deliver(entries);
  }

  pub(crate) fn register(&self, subscriber: Subscriber<BoxedObserver<Item, Err>>) -> Subscription {
    let subscription = subscriber.subscription().clone();
    let mut core = self.0.rc_deref_mut();
    let terminal = core.terminal.clone();
    if let Some(terminal) = &terminal {
      if !core.retained.replays_after_terminal() {
        drop(core);
        subscription.close(terminal.state());
        return subscription;
      }
    }

    // Replayed values are queued before the entry becomes visible, anything
    // emitted meanwhile lines up behind them.
    let entry = Serialized::new(subscriber);
    for v in core.retained.replay() {
      entry.push(Notification::Next(v));
    }
    let id = match terminal {
      Some(terminal) => {
        entry.push(terminal.into_notification());
        None
      }
      None => Some(core.subscribers.add(entry.clone())),
    };
    drop(core);
    entry.drain();

    if let Some(id) = id {
      let registry = self.0.downgrade();
      subscription.add_fn(move || {
        if let Some(core) = registry.upgrade() {
          let removed = core.rc_deref_mut().subscribers.remove(id);
          drop(removed);
        }
      });
    }
    subscription
  }
}

macro_rules! impl_subject {
  ($ty:ident) => {
    impl<Item, Err> Clone for $ty<Item, Err> {
      fn clone(&self) -> Self { $ty { core: self.core.clone() } }
    }

    impl<Item, Err> $ty<Item, Err> {
      /// Number of currently registered observers.
      pub fn observer_count(&self) -> usize { self.core.observer_count() }
    }

    impl<Item, Err> Observer<Item, Err> for $ty<Item, Err>
    where
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      #[inline]
      fn next(&mut self, value: Item) { self.core.emit_next(value) }

      #[inline]
      fn error(self, err: Err) { self.core.emit_error(err) }

      #[inline]
      fn complete(self) { self.core.emit_complete() }

      #[inline]
      fn is_closed(&self) -> bool { self.core.is_closed() }
    }

    impl<Item, Err> Observable for $ty<Item, Err>
    where
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      type Item = Item;
      type Err = Err;

      fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
      where
        O: Observer<Self::Item, Self::Err> + Send + 'static,
      {
        self.core.register(subscriber.map_observer(|o| Box::new(o) as BoxedObserver<Item, Err>))
      }
    }
  };
}

pub(crate) use impl_subject;

/// A plain multicast subject without retained state.
pub struct Subject<Item, Err = RxError> {
  core: SubjectCore<Item, Err, ()>,
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Subject { core: SubjectCore::new(()) } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl_subject!(Subject);
