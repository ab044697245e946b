use parking_lot::{Mutex, MutexGuard};
use std::{
  fmt::{Debug, Formatter},
  sync::{Arc, Weak},
};

/// Shared, lock guarded state.
///
/// Every piece of state touched by more than one execution unit (join state of
/// combinators, subject registries, subscription teardown lists) lives in a
/// `MutArc`. The lock is never poisoned, a panicking observer leaves the state
/// usable for the others.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

pub struct WeakMutArc<T>(Weak<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> MutexGuard<'_, T> { self.0.lock() }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> { self.0.lock() }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }

  pub fn downgrade(&self) -> WeakMutArc<T> { WeakMutArc(Arc::downgrade(&self.0)) }
}

impl<T> WeakMutArc<T> {
  pub fn upgrade(&self) -> Option<MutArc<T>> { self.0.upgrade().map(MutArc) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Clone for WeakMutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Debug> Debug for MutArc<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("MutArc").field(&*self.rc_deref()).finish()
  }
}
