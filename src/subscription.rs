use smallvec::SmallVec;
use std::{
  any::Any,
  fmt::{Debug, Formatter},
};
use tracing::trace;

use crate::rc::MutArc;

/// Anything that can be asked to stop: subscriptions, spawned tasks, subject
/// registrations.
pub trait SubscriptionLike {
  /// This allows deregistering a stream before it has finished receiving all
  /// events. Calling it more than once has no further effect.
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

impl<T: ?Sized> SubscriptionLike for Box<T>
where
  T: SubscriptionLike,
{
  #[inline]
  fn unsubscribe(&mut self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Lifecycle of one subscription. Every state but `Active` is terminal and
/// entered at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
  Active,
  Completed,
  Errored,
  Cancelled,
}

type Teardown = Box<dyn SubscriptionLike + Send>;
type Teardowns = SmallVec<[Teardown; 1]>;

struct Inner {
  state: SubscriptionState,
  teardown: Teardowns,
}

impl Default for Inner {
  fn default() -> Self { Inner { state: SubscriptionState::Active, teardown: SmallVec::new() } }
}

/// Handle to one active consumption of a stream.
///
/// Clones refer to the same subscription. The handle owns every resource that
/// was created to serve the subscribe call (upstream subscriptions, spawned
/// tasks, subject registrations); they are released when the subscription
/// leaves `Active`, whichever way it leaves.
#[derive(Clone, Default)]
pub struct Subscription(MutArc<Inner>);

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// A subscription that already ended in `state`.
  pub fn terminated(state: SubscriptionState) -> Self {
    Subscription(MutArc::own(Inner { state, teardown: SmallVec::new() }))
  }

  pub fn state(&self) -> SubscriptionState { self.0.rc_deref().state }

  /// Ties `teardown` to this subscription. If the subscription is already
  /// closed the teardown is released right away.
  pub fn add<S: SubscriptionLike + Send + 'static>(&self, mut teardown: S) {
    if self.is_same(&teardown) {
      return;
    }
    let mut inner = self.0.rc_deref_mut();
    if inner.state == SubscriptionState::Active {
      inner.teardown.retain(|v| !v.is_closed());
      inner.teardown.push(Box::new(teardown));
    } else {
      drop(inner);
      teardown.unsubscribe();
    }
  }

  /// Runs `f` once when this subscription ends.
  pub fn add_fn<F: FnOnce() + Send + 'static>(&self, f: F) { self.add(TeardownFn(Some(f))) }

  /// Moves an active subscription into `state` and returns the resources it
  /// owned. The caller releases them once it has delivered the terminal
  /// notification, never while holding any lock of its own.
  pub(crate) fn finish(&self, state: SubscriptionState) -> Option<Teardowns> {
    let mut inner = self.0.rc_deref_mut();
    if inner.state != SubscriptionState::Active {
      return None;
    }
    inner.state = state;
    Some(std::mem::take(&mut inner.teardown))
  }

  /// Ends the subscription in `state` without notifying anyone.
  pub(crate) fn close(&self, state: SubscriptionState) {
    if let Some(teardown) = self.finish(state) {
      release(teardown);
    }
  }

  /// Activates RAII behavior: `unsubscribe()` is called as soon as the
  /// returned guard goes out of scope.
  #[must_use]
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self) }

  fn is_same(&self, other: &dyn Any) -> bool {
    other.downcast_ref::<Self>().is_some_and(|other| self.0.ptr_eq(&other.0))
  }
}

pub(crate) fn release(teardown: Teardowns) {
  for mut v in teardown {
    v.unsubscribe();
  }
}

impl SubscriptionLike for Subscription {
  fn unsubscribe(&mut self) {
    if let Some(teardown) = self.finish(SubscriptionState::Cancelled) {
      trace!(teardown = teardown.len(), "subscription cancelled");
      release(teardown);
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.state() != SubscriptionState::Active }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.rc_deref();
    f.debug_struct("Subscription")
      .field("state", &inner.state)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

/// Closure run once on release.
pub struct TeardownFn<F>(Option<F>);

impl<F: FnOnce()> SubscriptionLike for TeardownFn<F> {
  fn unsubscribe(&mut self) {
    if let Some(f) = self.0.take() {
      f();
    }
  }

  fn is_closed(&self) -> bool { self.0.is_none() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// This structure is created by the
/// [`Subscription::unsubscribe_when_dropped`] method.
#[must_use]
#[derive(Debug)]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
  pub fn subscription(&self) -> &Subscription { &self.0 }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}
