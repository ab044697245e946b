use crate::observer::Observer;

/// One of the three things a stream can say.
///
/// At most one `Error` or `Complete` is ever produced for a subscription and
/// no `Next` follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Notification<Item, Err> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  /// Delivers this notification to `observer`.
  ///
  /// A terminal notification takes the observer out of the slot, so anything
  /// accepted afterwards is dropped.
  pub fn accept<O>(self, observer: &mut Option<O>)
  where
    O: Observer<Item, Err>,
  {
    match self {
      Notification::Next(value) => {
        if let Some(observer) = observer.as_mut() {
          observer.next(value);
        }
      }
      Notification::Error(err) => {
        if let Some(observer) = observer.take() {
          observer.error(err);
        }
      }
      Notification::Complete => {
        if let Some(observer) = observer.take() {
          observer.complete();
        }
      }
    }
  }
}
