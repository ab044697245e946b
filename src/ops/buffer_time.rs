//! Time windowed buffers: `buffer_with_time` and `buffer_with_time_or_count`.
//!
//! The upstream observer only appends to a shared [`Window`] and, when a
//! window is released by count or the source terminates, pokes the owning
//! task through a single-slot channel. Pokes coalesce while one is pending, so
//! a fast source never queues more than one of them. The task emits on those
//! pokes and on timer boundaries that are measured from a fixed origin.

use futures::{
  channel::mpsc::{channel, Receiver, Sender},
  future::{select, Either},
  StreamExt,
};
use std::{collections::VecDeque, mem, time::Duration};
use tracing::{trace, warn};

use crate::{
  error::RxError, observable::Observable, observer::Observer, ops::subscribe_child, rc::MutArc,
  scheduler::Scheduler, subscriber::Subscriber, subscription::Subscription,
};

/// When a window is released.
#[derive(Clone, Copy, Debug)]
struct Boundary {
  timespan: Duration,
  timeshift: Duration,
  count: Option<usize>,
}

impl Boundary {
  fn validate(&self) -> Result<(), RxError> {
    if self.timespan.is_zero() {
      return Err(RxError::illegal_input("timespan must be positive"));
    }
    if self.count == Some(0) {
      return Err(RxError::illegal_input("count must be positive"));
    }
    Ok(())
  }
}

/// Buffers source values and releases them on time (and optionally count)
/// boundaries.
///
/// - **time**: every `timespan` the current buffer is emitted, even when it is
///   empty. A non-zero `timeshift` then pauses collection for `timeshift`;
///   values arriving during the pause are dropped.
/// - **time or count**: the buffer is also emitted as soon as it holds `count`
///   values, which restarts the timer.
///
/// On completion or error the remaining buffer is emitted if it is not empty,
/// then the terminal notification is forwarded and the timer stops. A zero
/// `timespan` or `count` is rejected with an [`RxError::IllegalInput`] error
/// at subscription.
#[derive(Clone)]
pub struct BufferWithTime<S, SD> {
  source: S,
  scheduler: SD,
  boundary: Boundary,
}

impl<S, SD> BufferWithTime<S, SD> {
  pub fn with_time(source: S, timespan: Duration, timeshift: Duration, scheduler: SD) -> Self {
    BufferWithTime { source, scheduler, boundary: Boundary { timespan, timeshift, count: None } }
  }

  pub fn with_time_or_count(source: S, timespan: Duration, count: usize, scheduler: SD) -> Self {
    BufferWithTime {
      source,
      scheduler,
      boundary: Boundary { timespan, timeshift: Duration::ZERO, count: Some(count) },
    }
  }
}

/// Values collected so far, shared by the upstream observer and the task.
pub struct Window<Item, Err> {
  /// Windows released by count, not emitted yet.
  ready: VecDeque<Vec<Item>>,
  current: Vec<Item>,
  collecting: bool,
  terminal: Option<Result<(), Err>>,
}

impl<Item, Err> Window<Item, Err> {
  fn new() -> Self {
    Window { ready: VecDeque::new(), current: Vec::new(), collecting: true, terminal: None }
  }
}

/// Upstream side: fills the window and wakes the task when it has work.
pub struct BufferWindowObserver<Item, Err> {
  window: MutArc<Window<Item, Err>>,
  wake: Sender<()>,
  count: Option<usize>,
}

impl<Item, Err> BufferWindowObserver<Item, Err> {
  fn poke(&mut self) {
    // a full slot already holds a wake-up the task has not consumed
    let _ = self.wake.try_send(());
  }

  fn terminate(mut self, terminal: Result<(), Err>) {
    {
      let mut window = self.window.rc_deref_mut();
      if window.terminal.is_some() {
        return;
      }
      window.terminal = Some(terminal);
    }
    self.poke();
  }
}

impl<Item, Err> Observer<Item, Err> for BufferWindowObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    let released = {
      let mut window = self.window.rc_deref_mut();
      if window.terminal.is_some() || !window.collecting {
        return;
      }
      window.current.push(value);
      if self.count.is_some_and(|count| window.current.len() >= count) {
        let full = mem::take(&mut window.current);
        window.ready.push_back(full);
        true
      } else {
        false
      }
    };
    if released {
      self.poke();
    }
  }

  fn error(self, err: Err) { self.terminate(Err(err)) }

  fn complete(self) { self.terminate(Ok(())) }

  fn is_closed(&self) -> bool {
    self.wake.is_closed() || self.window.rc_deref().terminal.is_some()
  }
}

impl<S, SD> Observable for BufferWithTime<S, SD>
where
  S: Observable,
  S::Item: Send + 'static,
  S::Err: From<RxError> + Send + 'static,
  SD: Scheduler,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let BufferWithTime { source, scheduler, boundary } = self;
    let parent = subscriber.subscription().clone();
    if let Err(err) = boundary.validate() {
      warn!(?boundary, "buffer_with_time rejected: {err}");
      subscriber.error(err.into());
      return parent;
    }

    let window = MutArc::own(Window::new());
    let (wake, woken) = channel(1);
    let task = own_buffer(window.clone(), woken, subscriber, scheduler.clone(), boundary);
    parent.add(scheduler.spawn(task));
    let observer = BufferWindowObserver { window, wake, count: boundary.count };
    subscribe_child(source, observer, &parent);
    parent
  }
}

async fn own_buffer<Item, Err, O, SD>(
  window: MutArc<Window<Item, Err>>,
  mut woken: Receiver<()>,
  mut subscriber: Subscriber<O>,
  scheduler: SD,
  boundary: Boundary,
) where
  O: Observer<Vec<Item>, Err>,
  SD: Scheduler,
{
  let mut deadline = scheduler.now() + boundary.timespan;
  let mut paused = false;
  loop {
    if subscriber.is_closed() {
      return;
    }
    let timer = scheduler.sleep(deadline.saturating_duration_since(scheduler.now()));
    match select(woken.next(), timer).await {
      Either::Left((wake, _)) => {
        let (released, terminal) = {
          let mut window = window.rc_deref_mut();
          let released: Vec<_> = window.ready.drain(..).collect();
          let terminal = window.terminal.take();
          let rest = match terminal {
            Some(_) => mem::take(&mut window.current),
            None => Vec::new(),
          };
          (released, terminal.map(|t| (rest, t)))
        };
        if !released.is_empty() {
          trace!(windows = released.len(), "buffer released by count");
          for full in released {
            subscriber.next(full);
          }
          deadline = scheduler.now() + boundary.timespan;
        }
        match terminal {
          Some((rest, terminal)) => {
            if !rest.is_empty() {
              subscriber.next(rest);
            }
            match terminal {
              Ok(()) => subscriber.complete(),
              Err(err) => subscriber.error(err),
            }
            return;
          }
          // upstream went away without a terminal notification
          None if wake.is_none() => return,
          None => {}
        }
      }
      Either::Right(((), _)) if paused => {
        window.rc_deref_mut().collecting = true;
        paused = false;
        deadline += boundary.timespan;
      }
      Either::Right(((), _)) => {
        let (released, current) = {
          let mut window = window.rc_deref_mut();
          let released: Vec<_> = window.ready.drain(..).collect();
          if !boundary.timeshift.is_zero() {
            window.collecting = false;
          }
          (released, mem::take(&mut window.current))
        };
        trace!(len = current.len(), "buffer released by timer");
        for full in released {
          subscriber.next(full);
        }
        subscriber.next(current);
        if boundary.timeshift.is_zero() {
          deadline += boundary.timespan;
        } else {
          paused = true;
          deadline += boundary.timeshift;
        }
      }
    }
  }
}

#[cfg(all(test, feature = "tokio-scheduler"))]
mod tests {
  use crate::prelude::*;
  use futures::{future::BoxFuture, Future};
  use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
  };

  type Log = Arc<Mutex<Vec<Notification<Vec<i32>, RxError>>>>;

  fn ms(v: u64) -> Duration { Duration::from_millis(v) }

  fn record(source: impl Observable<Item = Vec<i32>, Err = RxError>) -> (Log, Subscription) {
    let log = Log::default();
    let c_log = log.clone();
    let subscription = source.subscribe_notification(move |n| c_log.lock().unwrap().push(n));
    (log, subscription)
  }

  fn nexts(windows: Vec<Vec<i32>>) -> Vec<Notification<Vec<i32>, RxError>> {
    windows.into_iter().map(Notification::Next).collect()
  }

  #[rxcore_macro::test(paused)]
  async fn emits_every_timespan_even_when_empty() {
    let mut subject = Subject::<i32>::new();
    let scheduler = TokioScheduler::current();
    let (log, _) = record(subject.clone().buffer_with_time(ms(100), Duration::ZERO, scheduler));

    tokio::time::sleep(ms(10)).await;
    subject.next(1);
    subject.next(2);
    tokio::time::sleep(ms(100)).await;
    // (100ms, 200ms) passes with nothing
    tokio::time::sleep(ms(100)).await;
    subject.next(3);
    tokio::time::sleep(ms(50)).await;
    subject.clone().complete();
    tokio::time::sleep(ms(10)).await;

    let mut expected = nexts(vec![vec![1, 2], vec![]]);
    expected.extend(nexts(vec![vec![3]]));
    expected.push(Notification::Complete);
    assert_eq!(*log.lock().unwrap(), expected);
  }

  #[rxcore_macro::test(paused)]
  async fn timeshift_drops_values_during_pause() {
    let mut subject = Subject::<i32>::new();
    let scheduler = TokioScheduler::current();
    let (log, _) = record(subject.clone().buffer_with_time(ms(100), ms(50), scheduler));

    tokio::time::sleep(ms(10)).await;
    subject.next(1);
    // first window closes at 100ms, paused until 150ms
    tokio::time::sleep(ms(110)).await;
    subject.next(2);
    tokio::time::sleep(ms(50)).await;
    subject.next(3);
    // second window closes at 250ms
    tokio::time::sleep(ms(100)).await;

    assert_eq!(*log.lock().unwrap(), nexts(vec![vec![1], vec![3]]));
  }

  #[rxcore_macro::test(paused)]
  async fn count_releases_early_and_restarts_timer() {
    let mut subject = Subject::<i32>::new();
    let scheduler = TokioScheduler::current();
    let (log, _) = record(subject.clone().buffer_with_time_or_count(ms(100), 2, scheduler));

    tokio::time::sleep(ms(60)).await;
    subject.next(1);
    subject.next(2);
    tokio::time::sleep(ms(10)).await;
    subject.next(3);
    // the count release at 60ms restarted the timer, next release at 160ms
    tokio::time::sleep(ms(60)).await;
    assert_eq!(*log.lock().unwrap(), nexts(vec![vec![1, 2]]));
    tokio::time::sleep(ms(40)).await;
    assert_eq!(*log.lock().unwrap(), nexts(vec![vec![1, 2], vec![3]]));
  }

  #[rxcore_macro::test(paused)]
  async fn error_flushes_remaining_buffer() {
    let mut subject = Subject::<i32>::new();
    let (log, subscription) =
      record(subject.clone().buffer_with_time_or_count(ms(100), 5, TokioScheduler::current()));

    subject.next(1);
    subject.clone().error(RxError::custom("boom"));
    tokio::time::sleep(ms(10)).await;

    let mut expected = nexts(vec![vec![1]]);
    expected.push(Notification::Error(RxError::custom("boom")));
    assert_eq!(*log.lock().unwrap(), expected);
    assert_eq!(subscription.state(), SubscriptionState::Errored);
  }

  #[rxcore_macro::test(paused)]
  async fn synchronous_source_is_flushed_on_complete() {
    let scheduler = TokioScheduler::current();
    let (log, _) = record(from_iter(1..=5).buffer_with_time_or_count(ms(100), 2, scheduler));
    tokio::time::sleep(ms(1)).await;

    let mut expected = nexts(vec![vec![1, 2], vec![3, 4], vec![5]]);
    expected.push(Notification::Complete);
    assert_eq!(*log.lock().unwrap(), expected);
  }

  #[rxcore_macro::test(paused)]
  async fn cancel_stops_timer_and_source() {
    let mut subject = Subject::<i32>::new();
    let (log, mut subscription) =
      record(subject.clone().buffer_with_time(ms(100), Duration::ZERO, TokioScheduler::current()));

    subject.next(1);
    subscription.unsubscribe();
    assert_eq!(subject.observer_count(), 0);
    tokio::time::sleep(ms(300)).await;

    assert!(log.lock().unwrap().is_empty());
  }

  #[rxcore_macro::test(paused)]
  async fn invalid_boundaries_are_rejected() {
    let scheduler = TokioScheduler::current();
    let (log, _) =
      record(from_iter(1..=3).buffer_with_time(Duration::ZERO, Duration::ZERO, scheduler.clone()));
    assert_eq!(
      *log.lock().unwrap(),
      vec![Notification::Error(RxError::illegal_input("timespan must be positive"))]
    );

    let (log, _) = record(from_iter(1..=3).buffer_with_time_or_count(ms(10), 0, scheduler));
    assert_eq!(
      *log.lock().unwrap(),
      vec![Notification::Error(RxError::illegal_input("count must be positive"))]
    );
  }

  #[rxcore_macro::test(paused)]
  async fn large_synchronous_source_lands_in_the_window() {
    let scheduler = TokioScheduler::current();
    let source = from_iter(0..100_000);
    let (log, _) = record(source.buffer_with_time(ms(100), Duration::ZERO, scheduler));
    tokio::time::sleep(ms(1)).await;

    let mut expected = nexts(vec![(0..100_000).collect()]);
    expected.push(Notification::Complete);
    assert_eq!(*log.lock().unwrap(), expected);
  }

  #[rxcore_macro::test(paused)]
  async fn count_windows_queue_up_before_the_task_runs() {
    let scheduler = TokioScheduler::current();
    let source = from_iter(0..10_000);
    let (log, _) = record(source.buffer_with_time_or_count(ms(100), 1_000, scheduler));
    tokio::time::sleep(ms(1)).await;

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 11);
    for (i, n) in log.iter().take(10).enumerate() {
      let start = i as i32 * 1_000;
      assert_eq!(n, &Notification::Next((start..start + 1_000).collect()));
    }
    assert_eq!(log.last(), Some(&Notification::Complete));
  }

  /// Every timer fires 5ms late.
  #[derive(Clone)]
  struct LateTimer(TokioScheduler);

  impl Scheduler for LateTimer {
    fn spawn<F>(&self, task: F) -> SpawnHandle
    where
      F: Future<Output = ()> + Send + 'static,
    {
      self.0.spawn(task)
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> { self.0.sleep(duration + ms(5)) }

    fn now(&self) -> Instant { self.0.now() }
  }

  #[rxcore_macro::test(paused)]
  async fn late_timers_do_not_shift_later_boundaries() {
    let start = tokio::time::Instant::now();
    let at = Arc::new(Mutex::new(vec![]));
    let c_at = at.clone();
    let _subscription = Subject::<i32>::new()
      .buffer_with_time(ms(100), Duration::ZERO, LateTimer(TokioScheduler::current()))
      .subscribe(move |_| c_at.lock().unwrap().push(start.elapsed().as_millis()));

    tokio::time::sleep(ms(1_010)).await;

    let at = at.lock().unwrap();
    assert_eq!(at.len(), 10);
    for (i, fired) in at.iter().enumerate() {
      let boundary = (i as u128 + 1) * 100 + 5;
      assert!((boundary..boundary + 2).contains(fired), "window {i} fired at {fired}ms");
    }
  }
}
