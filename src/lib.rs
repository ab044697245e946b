//! # rxcore: a reactive streams core
//!
//! Push based streams with explicit lifecycles, safe to drive from several
//! threads at once.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A cold, subscribable source of notifications |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to one active consumption, cancels it and owns its resources |
//! | [`Subject`] | Multicasts to every registered observer |
//! | [`Scheduler`] | Where production runs and how timers sleep |
//!
//! Multi-source combinators ([`zip`], [`combine_latest`], [`merge`],
//! [`race`], [`fork_join`], `concat_all`) and the windowed buffers
//! (`buffer_with_count`, `buffer_with_time`, `buffer_with_time_or_count`) are
//! chained through [`ObservableExt`].
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `futures::executor::ThreadPool` as a
//!   [`Scheduler`], timers from `futures-time`
//! - **`tokio-scheduler`** (default): [`TokioScheduler`] on a tokio runtime
//!   handle
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler
//! [`TokioScheduler`]: scheduler::TokioScheduler

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod serialized;
pub mod subject;
pub mod subscriber;
pub mod subscription;

// Re-export the prelude module
pub use prelude::*;

// Bring the README into Cargo-driven doctests.
#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
