//! The error kind raised by the crate itself.
//!
//! Upstream sources may use any error type. Operators that reject their own
//! configuration only require that type to be convertible from [`RxError`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RxError {
  /// An operator was configured with parameters it cannot work with, such as a
  /// zero count or a zero timespan. Delivered as the first and only
  /// notification to a subscriber.
  #[error("illegal input: {0}")]
  IllegalInput(String),
  /// A failure raised by a producer.
  #[error("{0}")]
  Custom(String),
}

impl RxError {
  pub fn illegal_input(msg: impl Into<String>) -> Self { RxError::IllegalInput(msg.into()) }

  pub fn custom(msg: impl Into<String>) -> Self { RxError::Custom(msg.into()) }
}
