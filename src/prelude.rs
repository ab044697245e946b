//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core traits
pub use crate::observable::{Observable, ObservableExt};
// Creation
pub use crate::observable::{
  create, empty, from_iter, interval, never, of, throw_err, timer, BoxedObservable,
  ConnectableObservable, Create, Empty, FromIter, Interval, Never, Of, ThrowErr,
};
// Observer side
pub use crate::observer::{BoxedObserver, Emitter, NotificationObserver, Observer, ObserverAll};
pub use crate::{notification::Notification, subscriber::Subscriber};
// Operators
pub use crate::ops::{combine_latest, fork_join, merge, race, zip};
// Scheduler
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
pub use crate::scheduler::{Scheduler, SpawnHandle};
// Subject
pub use crate::subject::{BehaviorSubject, ReplaySubject, Subject};
// Subscription
pub use crate::subscription::{
  Subscription, SubscriptionGuard, SubscriptionLike, SubscriptionState,
};
pub use crate::{error::RxError, rc::MutArc};
