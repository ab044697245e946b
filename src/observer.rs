//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use crate::notification::Notification;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// `error` and `complete` consume the observer, so a second terminal
/// notification cannot be expressed. Observers that are shared between
/// several producers sit behind a [`Serialized`] gate, which delivers one
/// notification at a time and drops everything after the first terminal one.
///
/// [`Serialized`]: crate::serialized::Serialized
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  fn error(self, err: Err);

  /// Handle completion of the observable
  fn complete(self);

  /// Returns `true` if the observer will not accept more values.
  ///
  /// Sources poll this between emissions to stop producing early.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// Emitter Trait
// ============================================================================

/// Emission facade handed to the producer closure of [`create`].
///
/// All methods take `&mut self` so the closure can be written against
/// `&mut dyn Emitter` without knowing the downstream observer type. Calls
/// after a terminal notification are ignored.
///
/// [`create`]: crate::observable::create
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: Err);
  fn complete(&mut self);
  fn is_closed(&self) -> bool;
}

// ============================================================================
// DynObserver Trait - Object-safe Observer
// ============================================================================

/// Helper trait to enable object-safe Observers (Box<dyn Observer>)
///
/// Standard Observer trait is not object-safe because terminal methods take
/// `self` by value. DynObserver mirrors the interface for vtables.
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { (*self).error(err); }
  fn box_complete(self: Box<Self>) { (*self).complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// A type erased observer that can cross threads.
pub type BoxedObserver<Item, Err> = Box<dyn DynObserver<Item, Err> + Send>;

impl<Item, Err> Observer<Item, Err> for BoxedObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

// ============================================================================
// Option<O>
// ============================================================================

impl<Item, Err, O> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if let Some(observer) = self {
      observer.next(value);
    }
  }

  #[inline]
  fn error(self, err: Err) {
    if let Some(observer) = self {
      observer.error(err);
    }
  }

  #[inline]
  fn complete(self) {
    if let Some(observer) = self {
      observer.complete();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.as_ref().map_or(true, |o| o.is_closed()) }
}

// ============================================================================
// Closure observers
// ============================================================================

/// Observer built from three closures, used by the `subscribe*` family.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { ObserverAll { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(self) { (self.complete)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Observer that funnels every event into one closure as a [`Notification`].
pub struct NotificationObserver<F>(pub(crate) F);

impl<Item, Err, F> Observer<Item, Err> for NotificationObserver<F>
where
  F: FnMut(Notification<Item, Err>),
{
  fn next(&mut self, value: Item) { (self.0)(Notification::Next(value)) }

  fn error(mut self, err: Err) { (self.0)(Notification::Error(err)) }

  fn complete(mut self) { (self.0)(Notification::Complete) }

  fn is_closed(&self) -> bool { false }
}
