use crate::{
  notification::Notification, observer::BoxedObserver, serialized::Serialized,
  subscriber::Subscriber,
};

/// One registered observer.
pub(crate) type Entry<Item, Err> =
  Serialized<Item, Err, Subscriber<BoxedObserver<Item, Err>>>;

/// Observers of a subject in registration order, addressed by id so a
/// subscription can remove exactly its own entry.
pub(crate) struct Subscribers<Item, Err> {
  next_id: usize,
  entries: Vec<(usize, Entry<Item, Err>)>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { next_id: 0, entries: Vec::new() } }
}

impl<Item, Err> Subscribers<Item, Err> {
  pub(crate) fn add(&mut self, entry: Entry<Item, Err>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.entries.push((id, entry));
    id
  }

  pub(crate) fn remove(&mut self, id: usize) -> Option<Entry<Item, Err>> {
    let idx = self.entries.iter().position(|(i, _)| *i == id)?;
    Some(self.entries.remove(idx).1)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.entries.len() }

  /// Queues `value` for every observer registered right now, cloning it for
  /// all but the last, and returns the entries to drain.
  pub(crate) fn queue_value(&self, value: Item) -> Vec<Entry<Item, Err>>
  where
    Item: Clone,
  {
    if let Some(((_, last), rest)) = self.entries.split_last() {
      for (_, entry) in rest {
        entry.push(Notification::Next(value.clone()));
      }
      last.push(Notification::Next(value));
    }
    self.entries.iter().map(|(_, e)| e.clone()).collect()
  }

  /// Empties the registry, queueing `terminal` for every observer.
  pub(crate) fn queue_terminal(
    &mut self,
    terminal: Notification<Item, Err>,
  ) -> Vec<Entry<Item, Err>>
  where
    Err: Clone,
  {
    let entries: Vec<_> = self.entries.drain(..).map(|(_, e)| e).collect();
    for entry in &entries {
      let terminal = match &terminal {
        Notification::Error(err) => Notification::Error(err.clone()),
        _ => Notification::Complete,
      };
      entry.push(terminal);
    }
    entries
  }
}

/// Delivers whatever was queued. Called without the subject lock.
pub(crate) fn deliver<Item, Err>(entries: Vec<Entry<Item, Err>>) {
  for entry in entries {
    entry.drain();
  }
}
