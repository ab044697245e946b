//! Integration tests for rxcore
//!
//! Tests operator chains, subject lifecycles, combinator error propagation and
//! threading behavior through the public API only.

use std::{
  fmt::Debug,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
  thread,
  time::Duration,
};

use rxcore::prelude::*;

type Log<T> = Arc<Mutex<Vec<Notification<T, RxError>>>>;

fn record<S>(source: S) -> (Log<S::Item>, Subscription)
where
  S: Observable<Err = RxError>,
  S::Item: Send + 'static,
{
  let log: Log<S::Item> = Arc::new(Mutex::new(vec![]));
  let c_log = log.clone();
  let subscription = source.subscribe_notification(move |n| c_log.lock().unwrap().push(n));
  (log, subscription)
}

#[rxcore_macro::test]
fn test_basic_chain_integration() {
  let result = Arc::new(Mutex::new(Vec::new()));
  let result_clone = result.clone();

  from_iter(1..=10)
    .map(|x| x * 2)
    .filter(|&x| x > 10)
    .take(3)
    .subscribe(move |v| result_clone.lock().unwrap().push(v));

  assert_eq!(*result.lock().unwrap(), vec![12, 14, 16]);
}

#[rxcore_macro::test]
fn test_pipe_with_user_operator() {
  fn evens_doubled<S>(source: S) -> impl Observable<Item = i32, Err = RxError>
  where
    S: Observable<Item = i32, Err = RxError>,
  {
    source.filter(|v| v % 2 == 0).map(|v| v * 2)
  }

  let (log, _) = record(from_iter(1..=6).pipe(evens_doubled).buffer_with_count(2, 2));

  assert_eq!(
    *log.lock().unwrap(),
    vec![
      Notification::Next(vec![4, 8]),
      Notification::Next(vec![12]),
      Notification::Complete
    ]
  );
}

#[rxcore_macro::test]
fn test_zip_shortest_input_wins() {
  let (log, _) = record(from_iter(0..3).zip_with([from_iter(0..5), from_iter(0..2)]));

  assert_eq!(
    *log.lock().unwrap(),
    vec![
      Notification::Next(vec![0, 0, 0]),
      Notification::Next(vec![1, 1, 1]),
      Notification::Complete
    ]
  );
}

#[rxcore_macro::test]
fn test_combine_latest_first_emission_waits_for_all() {
  let mut a = Subject::<i32>::new();
  let mut b = Subject::<i32>::new();
  let (log, _) = record(a.clone().combine_latest_with([b.clone()]));

  a.next(1);
  assert!(log.lock().unwrap().is_empty());
  b.next(2);

  assert_eq!(*log.lock().unwrap(), vec![Notification::Next(vec![1, 2])]);
}

#[rxcore_macro::test]
fn test_error_propagation_cancels_siblings() {
  type Combine = fn(Vec<Subject<i32>>) -> BoxedObservable<Vec<i32>, RxError>;
  let combinators: [(&str, Combine); 4] = [
    ("merge", |s| merge(s).map(|v| vec![v]).box_it()),
    ("zip", |s| zip(s).box_it()),
    ("combine_latest", |s| combine_latest(s).box_it()),
    ("fork_join", |s| fork_join(s).box_it()),
  ];

  for (name, combine) in combinators {
    let mut healthy = Subject::<i32>::new();
    let failing = Subject::<i32>::new();
    let (log, subscription) = record(combine(vec![healthy.clone(), failing.clone()]));

    failing.clone().error(RxError::custom(name));
    healthy.next(1);

    assert_eq!(
      *log.lock().unwrap(),
      vec![Notification::Error(RxError::custom(name))],
      "{name}"
    );
    assert_eq!(subscription.state(), SubscriptionState::Errored, "{name}");
    assert_eq!(healthy.observer_count(), 0, "{name} kept its sibling subscribed");
  }
}

#[rxcore_macro::test(paused)]
async fn test_race_only_the_earliest_input_produces() {
  let counters: Vec<_> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
  let inputs: Vec<_> = [50u64, 20, 35]
    .into_iter()
    .zip(&counters)
    .map(|(delay, counter)| {
      let counter = counter.clone();
      interval(Duration::from_millis(10), TokioScheduler::current())
        .with_delay(Duration::from_millis(delay))
        .tap(move |_| {
          counter.fetch_add(1, Ordering::SeqCst);
        })
        .box_it()
    })
    .collect();
  let (log, subscription) = record(race(inputs).take(3));

  tokio::time::sleep(Duration::from_millis(200)).await;

  let counts: Vec<_> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
  assert_eq!(counts, vec![0, 3, 0]);
  assert_eq!(
    *log.lock().unwrap(),
    vec![
      Notification::Next(0),
      Notification::Next(1),
      Notification::Next(2),
      Notification::Complete
    ]
  );
  assert_eq!(subscription.state(), SubscriptionState::Completed);
}

#[rxcore_macro::test]
fn test_subject_completion_is_idempotent() {
  let completions = Arc::new(AtomicUsize::new(0));
  let subject = Subject::<i32>::new();
  for _ in 0..2 {
    let completions = completions.clone();
    subject.clone().subscribe_complete(
      |_| {},
      move || {
        completions.fetch_add(1, Ordering::SeqCst);
      },
    );
  }

  subject.clone().complete();
  subject.clone().complete();
  subject.clone().error(RxError::custom("ignored"));

  assert_eq!(completions.load(Ordering::SeqCst), 2);
  assert_eq!(subject.observer_count(), 0);
}

#[rxcore_macro::test]
fn test_subject_shared_across_threads() {
  let subject = Subject::<usize>::new();
  let received = Arc::new(Mutex::new(Vec::new()));
  let c_received = received.clone();
  subject.clone().subscribe(move |v| c_received.lock().unwrap().push(v));

  let handles: Vec<_> = (0..4)
    .map(|t| {
      let mut subject = subject.clone();
      thread::spawn(move || {
        for i in 0..50 {
          subject.next(t * 1000 + i);
        }
      })
    })
    .collect();
  for handle in handles {
    handle.join().unwrap();
  }

  let mut received = received.lock().unwrap().clone();
  assert_eq!(received.len(), 200);
  // every producer's values keep their relative order
  for t in 0..4 {
    let own: Vec<_> = received.iter().copied().filter(|v| v / 1000 == t).collect();
    assert_eq!(own, (0..50).map(|i| t * 1000 + i).collect::<Vec<_>>());
  }
  received.sort_unstable();
  received.dedup();
  assert_eq!(received.len(), 200);
}

#[rxcore_macro::test]
fn test_replay_subject_late_subscriber_after_completion() {
  let mut subject = ReplaySubject::<i32>::new(2);
  subject.next(1);
  subject.next(2);
  subject.next(3);
  subject.clone().complete();

  let (log, subscription) = record(subject.clone());

  assert_eq!(
    *log.lock().unwrap(),
    vec![Notification::Next(2), Notification::Next(3), Notification::Complete]
  );
  assert_eq!(subscription.state(), SubscriptionState::Completed);
}

#[rxcore_macro::test]
fn test_guard_unsubscribes_on_drop() {
  let mut subject = Subject::<i32>::new();
  let seen = Arc::new(Mutex::new(vec![]));
  {
    let c_seen = seen.clone();
    let _guard = subject
      .clone()
      .subscribe(move |v| c_seen.lock().unwrap().push(v))
      .unsubscribe_when_dropped();
    subject.next(1);
  }
  subject.next(2);

  assert_eq!(*seen.lock().unwrap(), vec![1]);
  assert_eq!(subject.observer_count(), 0);
}

#[rxcore_macro::test(paused)]
async fn test_time_buffer_over_interval() {
  let (log, _) = record(
    interval(Duration::from_millis(10), TokioScheduler::current())
      .take(7)
      .buffer_with_time(Duration::from_millis(45), Duration::ZERO, TokioScheduler::current()),
  );

  tokio::time::sleep(Duration::from_millis(200)).await;

  assert_eq!(
    *log.lock().unwrap(),
    vec![
      Notification::Next(vec![0, 1, 2, 3]),
      Notification::Next(vec![4, 5, 6]),
      Notification::Complete
    ]
  );
}

#[rxcore_macro::test]
fn test_subscribe_on_thread_pool() {
  let pool = futures::executor::ThreadPool::new().unwrap();
  let (tx, rx) = std::sync::mpsc::channel();

  from_iter(1..=5)
    .subscribe_on(pool)
    .buffer_with_count(5, 5)
    .subscribe_complete(
      {
        let tx = tx.clone();
        move |v| tx.send(Some(v)).unwrap()
      },
      move || tx.send(None).unwrap(),
    );

  assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Some(vec![1, 2, 3, 4, 5]));
  assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), None);
}

#[rxcore_macro::test]
fn test_concat_all_of_boxed_sources() {
  let (log, _) = record(
    from_iter([of(1).box_it(), empty().box_it(), from_iter(2..=3).box_it()]).concat_all(),
  );

  assert_eq!(
    *log.lock().unwrap(),
    vec![
      Notification::Next(1),
      Notification::Next(2),
      Notification::Next(3),
      Notification::Complete
    ]
  );
}

const PER_INPUT: i32 = 500;

/// Drives every subject from its own task: input `t` emits
/// `t * 10_000 + i` for `i` in `0..PER_INPUT`, then completes.
async fn feed_concurrently(inputs: &[Subject<i32>]) {
  let producers: Vec<_> = inputs
    .iter()
    .enumerate()
    .map(|(t, subject)| {
      let mut subject = subject.clone();
      tokio::spawn(async move {
        for i in 0..PER_INPUT {
          subject.next(t as i32 * 10_000 + i);
          if i % 16 == 0 {
            tokio::task::yield_now().await;
          }
        }
        subject.complete();
      })
    })
    .collect();
  for producer in producers {
    producer.await.unwrap();
  }
}

fn subjects(n: usize) -> Vec<Subject<i32>> { (0..n).map(|_| Subject::new()).collect() }

/// Values of the log, asserting that exactly one terminal notification
/// closes it.
fn values_before_single_terminal<T: Clone + PartialEq + Debug>(log: &Log<T>) -> Vec<T> {
  let log = log.lock().unwrap();
  let terminals = log.iter().filter(|n| !matches!(n, Notification::Next(_))).count();
  assert_eq!(terminals, 1, "terminal notifications");
  assert_eq!(log.last(), Some(&Notification::Complete));
  log
    .iter()
    .filter_map(|n| match n {
      Notification::Next(v) => Some(v.clone()),
      _ => None,
    })
    .collect()
}

fn of_input(values: &[i32], t: i32) -> Vec<i32> {
  values.iter().copied().filter(|v| v / 10_000 == t).collect()
}

fn expected_of_input(t: i32) -> Vec<i32> { (0..PER_INPUT).map(|i| t * 10_000 + i).collect() }

#[rxcore_macro::test(shared)]
async fn test_merge_under_concurrent_inputs() {
  let inputs = subjects(4);
  let (log, subscription) = record(merge(inputs.clone()));

  feed_concurrently(&inputs).await;

  let values = values_before_single_terminal(&log);
  assert_eq!(values.len(), 4 * PER_INPUT as usize);
  for t in 0..4 {
    assert_eq!(of_input(&values, t), expected_of_input(t));
  }
  assert_eq!(subscription.state(), SubscriptionState::Completed);
}

#[rxcore_macro::test(shared)]
async fn test_zip_under_concurrent_inputs() {
  let inputs = subjects(3);
  let (log, subscription) = record(zip(inputs.clone()));

  feed_concurrently(&inputs).await;

  let tuples = values_before_single_terminal(&log);
  let expected: Vec<_> = (0..PER_INPUT).map(|i| vec![i, 10_000 + i, 20_000 + i]).collect();
  assert_eq!(tuples, expected);
  assert_eq!(subscription.state(), SubscriptionState::Completed);
}

#[rxcore_macro::test(shared)]
async fn test_combine_latest_under_concurrent_inputs() {
  let inputs = subjects(3);
  let (log, subscription) = record(combine_latest(inputs.clone()));

  feed_concurrently(&inputs).await;

  let emissions = values_before_single_terminal(&log);
  // every input's component only moves forward
  for pair in emissions.windows(2) {
    assert!(pair[0].iter().zip(&pair[1]).all(|(before, after)| before <= after), "{pair:?}");
  }
  let last = PER_INPUT - 1;
  assert_eq!(emissions.last(), Some(&vec![last, 10_000 + last, 20_000 + last]));
  assert_eq!(subscription.state(), SubscriptionState::Completed);
}

#[rxcore_macro::test(shared)]
async fn test_race_under_concurrent_inputs() {
  let inputs = subjects(4);
  let (log, subscription) = record(race(inputs.clone()));

  feed_concurrently(&inputs).await;

  let values = values_before_single_terminal(&log);
  let winner = values[0] / 10_000;
  assert_eq!(values, expected_of_input(winner));
  assert!(inputs.iter().all(|s| s.observer_count() == 0));
  assert_eq!(subscription.state(), SubscriptionState::Completed);
}

#[rxcore_macro::test(shared)]
async fn test_count_buffer_under_concurrent_producers() {
  let inputs = subjects(4);
  let (log, _) = record(merge(inputs.clone()).buffer_with_count(10, 10));

  feed_concurrently(&inputs).await;

  let windows = values_before_single_terminal(&log);
  assert_eq!(windows.len(), 4 * PER_INPUT as usize / 10);
  assert!(windows.iter().all(|w| w.len() == 10));
  let values: Vec<_> = windows.concat();
  for t in 0..4 {
    assert_eq!(of_input(&values, t), expected_of_input(t));
  }
}

#[rxcore_macro::test(shared)]
async fn test_time_buffer_under_concurrent_producers() {
  let inputs = subjects(4);
  let (log, _) = record(merge(inputs.clone()).buffer_with_time_or_count(
    Duration::from_millis(20),
    64,
    TokioScheduler::current(),
  ));

  feed_concurrently(&inputs).await;
  for _ in 0..200 {
    if log.lock().unwrap().last() == Some(&Notification::Complete) {
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }

  let windows = values_before_single_terminal(&log);
  assert!(windows.iter().all(|w| w.len() <= 64));
  let values: Vec<_> = windows.concat();
  assert_eq!(values.len(), 4 * PER_INPUT as usize);
  for t in 0..4 {
    assert_eq!(of_input(&values, t), expected_of_input(t));
  }
}
