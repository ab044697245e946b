//! Serialized delivery to one observer.
//!
//! Every shared-state operator and every subject entry reaches its downstream
//! through a [`Serialized`] gate. Producers `push` notifications, possibly
//! under a lock of their own that orders them, and `drain` once that lock is
//! released. Whoever drains first delivers everything that is queued,
//! including what concurrent or re-entrant producers add meanwhile; the others
//! return at once. No lock is held while the observer runs, so an observer may
//! call back into the very operator or subject that is feeding it.

use std::collections::VecDeque;

use crate::{notification::Notification, observer::Observer, rc::MutArc};

struct Gate<Item, Err, O> {
  observer: Option<O>,
  pending: VecDeque<Notification<Item, Err>>,
  delivering: bool,
  terminated: bool,
}

pub struct Serialized<Item, Err, O>(MutArc<Gate<Item, Err, O>>);

impl<Item, Err, O> Clone for Serialized<Item, Err, O> {
  fn clone(&self) -> Self { Serialized(self.0.clone()) }
}

impl<Item, Err, O> Serialized<Item, Err, O>
where
  O: Observer<Item, Err>,
{
  pub fn new(observer: O) -> Self {
    Serialized(MutArc::own(Gate {
      observer: Some(observer),
      pending: VecDeque::new(),
      delivering: false,
      terminated: false,
    }))
  }

  /// Queues `notification` without delivering it. Returns `false` when a
  /// terminal notification was queued before, in which case nothing is
  /// queued.
  pub fn push(&self, notification: Notification<Item, Err>) -> bool {
    let mut gate = self.0.rc_deref_mut();
    if gate.terminated {
      return false;
    }
    gate.terminated = notification.is_terminal();
    gate.pending.push_back(notification);
    true
  }

  /// Delivers the queue in order unless another caller already is.
  pub fn drain(&self) {
    {
      let mut gate = self.0.rc_deref_mut();
      if gate.delivering {
        return;
      }
      gate.delivering = true;
    }
    loop {
      let mut gate = self.0.rc_deref_mut();
      let Some(notification) = gate.pending.pop_front() else {
        gate.delivering = false;
        return;
      };
      let mut observer = gate.observer.take();
      drop(gate);
      notification.accept(&mut observer);
      self.0.rc_deref_mut().observer = observer;
    }
  }

  #[inline]
  pub fn emit(&self, notification: Notification<Item, Err>) -> bool {
    let accepted = self.push(notification);
    self.drain();
    accepted
  }

  /// Whether a terminal notification has been queued, or the observer
  /// refuses further values.
  pub fn is_closed(&self) -> bool {
    let gate = self.0.rc_deref();
    gate.terminated || gate.observer.as_ref().is_some_and(|o| o.is_closed())
  }
}

impl<Item, Err, O> Observer<Item, Err> for Serialized<Item, Err, O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.emit(Notification::Next(value)); }

  #[inline]
  fn error(self, err: Err) { self.emit(Notification::Error(err)); }

  #[inline]
  fn complete(self) { self.emit(Notification::Complete); }

  #[inline]
  fn is_closed(&self) -> bool { Serialized::is_closed(self) }
}
