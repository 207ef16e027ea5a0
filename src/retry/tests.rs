//! Integration tests for retrying producers.

use super::*;
use crate::testing::FlakySource;
use futures::{poll, stream, StreamExt};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::task::Poll;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_delayed_always_failing_makes_three_attempts() {
    let source = FlakySource::<i32, _>::always_failing("error");
    let delays = Arc::new(Mutex::new(Vec::new()));

    let producer = retry_with_hooks(
        source.factory(),
        RetryPolicy::delayed(2, Duration::from_secs(3)),
        {
            let delays = delays.clone();
            move |event: &RetryEvent<'_, &str>| {
                if let Some(d) = event.next_delay {
                    delays.lock().unwrap().push(d);
                }
            }
        },
    );

    let start = Instant::now();
    let items: Vec<_> = producer.collect().await;
    let elapsed = start.elapsed();

    assert_eq!(items, vec![Err("error")]);
    assert_eq!(source.subscriptions(), 3); // 1 original + 2 retries
    assert_eq!(
        *delays.lock().unwrap(),
        vec![Duration::from_secs(3), Duration::from_secs(3)]
    );
    assert!(
        elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7),
        "Expected two 3s waits, got {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn test_immediate_recovers_after_one_failure() {
    let source = FlakySource::new(1, "transient").then_emit(vec![7, 8]);
    let start = Instant::now();

    let mut producer = retry(source.factory(), RetryPolicy::immediate(2));
    let mut items = Vec::new();
    while let Some(item) = producer.next().await {
        items.push(item);
    }

    assert_eq!(items, vec![Ok(7), Ok(8)]);
    assert_eq!(source.subscriptions(), 2);
    assert_eq!(producer.attempts_made(), 1);
    assert_eq!(producer.last_error(), Some(&"transient"));
    assert_eq!(producer.phase(), RetryPhase::Completed);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_zero_max_count_fails_without_evaluating_delay() {
    let evaluations = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy::custom_timer_delayed(0, {
        let evaluations = evaluations.clone();
        move |_| {
            evaluations.fetch_add(1, Ordering::SeqCst);
            Duration::from_secs(1)
        }
    });
    let source = FlakySource::<(), _>::always_failing("fatal");

    let mut producer = retry(source.factory(), policy);

    assert_eq!(producer.next().await, Some(Err("fatal")));
    assert_eq!(producer.next().await, None);
    assert_eq!(producer.phase(), RetryPhase::Failed);
    assert_eq!(evaluations.load(Ordering::SeqCst), 0);
    assert_eq!(source.subscriptions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_waiting_prevents_resubscription() {
    let source = FlakySource::<i32, _>::always_failing("error");
    let mut producer = retry(
        source.factory(),
        RetryPolicy::delayed(5, Duration::from_secs(10)),
    );

    assert!(poll!(producer.next()).is_pending());
    assert_eq!(producer.phase(), RetryPhase::Waiting);
    assert_eq!(source.subscriptions(), 1);

    producer.cancel();
    assert_eq!(producer.phase(), RetryPhase::Cancelled);

    tokio::time::advance(Duration::from_secs(60)).await;

    assert_eq!(producer.next().await, None);
    assert_eq!(source.subscriptions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_handle_from_another_task() {
    let source = FlakySource::<i32, _>::always_failing("error");
    let mut producer = retry(
        source.factory(),
        RetryPolicy::delayed(RetryPolicy::UNBOUNDED, Duration::from_secs(1)),
    );
    let handle = producer.cancel_handle();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.cancel();
    });

    assert_eq!(producer.next().await, None);
    canceller.await.unwrap();

    // Subscribed at 0s, 1s and 2s; cancelled while waiting for 3s.
    assert_eq!(source.subscriptions(), 3);
    assert_eq!(producer.phase(), RetryPhase::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_producer_discards_pending_timer() {
    let source = FlakySource::<i32, _>::always_failing("error");
    let mut producer = retry(
        source.factory(),
        RetryPolicy::delayed(3, Duration::from_secs(1)),
    );

    assert!(poll!(producer.next()).is_pending());
    drop(producer);
    tokio::time::advance(Duration::from_secs(10)).await;

    assert_eq!(source.subscriptions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_exponential_delays_between_attempts() {
    let source = FlakySource::new(2, "retry").then_emit(vec!["done"]);
    let start = Instant::now();

    let items: Vec<_> = retry(
        source.factory(),
        RetryPolicy::exponential_delayed(2, Duration::from_secs(3), 2.0),
    )
    .collect()
    .await;

    assert_eq!(items, vec![Ok("done")]);
    assert_eq!(source.subscriptions(), 3);
    // 3s before the first retry, 6s before the second
    assert!(start.elapsed() >= Duration::from_secs(9));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_custom_timer_called_once_per_retry() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let policy = RetryPolicy::custom_timer_delayed(2, {
        let calls = calls.clone();
        move |attempt| {
            calls.lock().unwrap().push(attempt);
            Duration::from_secs(3)
        }
    });
    let source = FlakySource::<u8, _>::always_failing("error");

    let items: Vec<_> = retry(source.factory(), policy).collect().await;

    assert_eq!(items, vec![Err("error")]);
    assert_eq!(*calls.lock().unwrap(), vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_values_from_failed_attempts_are_forwarded_in_order() {
    let source = FlakySource::new(2, "flaky")
        .emitting_before_failure(vec![0])
        .then_emit(vec![1, 2]);

    let items: Vec<_> = retry(
        source.factory(),
        RetryPolicy::delayed(3, Duration::from_millis(50)),
    )
    .collect()
    .await;

    assert_eq!(items, vec![Ok(0), Ok(0), Ok(1), Ok(2)]);
}

#[tokio::test]
async fn test_attempts_never_overlap() {
    let live = Arc::new(AtomicU32::new(0));
    let max_live = Arc::new(AtomicU32::new(0));
    let calls = Arc::new(AtomicU32::new(0));

    struct Guard(Arc<AtomicU32>);
    impl Drop for Guard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    let factory = {
        let (live, max_live, calls) = (live.clone(), max_live.clone(), calls.clone());
        move || {
            let now = live.fetch_add(1, Ordering::SeqCst) + 1;
            max_live.fetch_max(now, Ordering::SeqCst);
            let guard = Guard(live.clone());
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let item = if n < 3 { Err("again") } else { Ok(n) };
            stream::iter(vec![item]).map(move |i| {
                let _alive = &guard;
                i
            })
        }
    };

    let items: Vec<_> = retry(factory, RetryPolicy::immediate(5)).collect().await;

    assert_eq!(items, vec![Ok(3)]);
    assert_eq!(max_live.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_if_skips_non_retryable_errors() {
    #[derive(Debug, PartialEq, Clone)]
    #[allow(dead_code)]
    enum TestError {
        Transient,
        Permanent,
    }

    let source = FlakySource::<(), _>::always_failing(TestError::Permanent);

    let items: Vec<_> = retry_if(
        source.factory(),
        RetryPolicy::immediate(5),
        |err| matches!(err, TestError::Transient),
    )
    .collect()
    .await;

    assert_eq!(items, vec![Err(TestError::Permanent)]);
    assert_eq!(source.subscriptions(), 1); // No retries for permanent error
}

#[tokio::test]
async fn test_retry_if_retries_transient_errors() {
    #[derive(Debug, PartialEq, Clone)]
    enum TestError {
        Transient,
    }

    let source = FlakySource::new(2, TestError::Transient).then_emit(vec!["success"]);

    let items: Vec<_> = retry_if(source.factory(), RetryPolicy::immediate(5), |err| {
        matches!(err, TestError::Transient)
    })
    .collect()
    .await;

    assert_eq!(items, vec![Ok("success")]);
    assert_eq!(source.subscriptions(), 3);
}

#[tokio::test]
async fn test_retry_with_hooks_reports_every_failure() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let source = FlakySource::<(), _>::always_failing("down");

    let items: Vec<_> = retry_with_hooks(source.factory(), RetryPolicy::immediate(2), {
        let events = events.clone();
        move |event: &RetryEvent<'_, &'static str>| {
            events
                .lock()
                .unwrap()
                .push((event.attempt, *event.error, event.next_delay));
        }
    })
    .collect()
    .await;

    assert_eq!(items, vec![Err("down")]);
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            (1, "down", Some(Duration::ZERO)),
            (2, "down", Some(Duration::ZERO)),
            (3, "down", None),
        ]
    );
}

#[tokio::test]
async fn test_factory_is_lazy() {
    let source = FlakySource::new(0, "unused").then_emit(vec![1]);
    let producer = retry(source.factory(), RetryPolicy::immediate(1));

    assert_eq!(producer.phase(), RetryPhase::Running);
    assert_eq!(source.subscriptions(), 0);

    let items: Vec<_> = producer.collect().await;
    assert_eq!(items, vec![Ok(1)]);
    assert_eq!(source.subscriptions(), 1);
}

#[tokio::test]
async fn test_terminated_producer_stays_terminated() {
    use futures::stream::FusedStream;

    let mut producer = retry(|| stream::iter(vec![Ok::<_, &str>(1)]), RetryPolicy::immediate(0));

    assert!(!producer.is_terminated());
    assert_eq!(producer.next().await, Some(Ok(1)));
    assert_eq!(producer.next().await, None);
    assert!(producer.is_terminated());

    producer.cancel();
    assert_eq!(producer.phase(), RetryPhase::Completed);
    assert_eq!(producer.next().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_policy_keeps_retrying() {
    let source = FlakySource::new(50, "busy").then_emit(vec![()]);

    let items: Vec<_> = retry(
        source.factory(),
        RetryPolicy::immediate(RetryPolicy::UNBOUNDED),
    )
    .collect()
    .await;

    assert_eq!(items, vec![Ok(())]);
    assert_eq!(source.subscriptions(), 51);
}

#[tokio::test]
async fn test_zero_delay_yields_to_executor() {
    let source = FlakySource::new(1, "once").then_emit(vec![1]);
    let mut producer = retry(source.factory(), RetryPolicy::immediate(1));

    // The first poll fails and yields instead of resubscribing in place.
    assert_eq!(poll!(producer.next()), Poll::Pending);
    assert_eq!(producer.phase(), RetryPhase::Waiting);
    assert_eq!(source.subscriptions(), 1);

    assert_eq!(producer.next().await, Some(Ok(1)));
    assert_eq!(source.subscriptions(), 2);
}

#[test]
#[tracing_test::traced_test]
fn test_delay_without_runtime_surfaces_failure() {
    let source = FlakySource::<i32, _>::always_failing("offline");
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut producer = retry_with_hooks(
        source.factory(),
        RetryPolicy::delayed(3, Duration::from_secs(1)),
        {
            let events = events.clone();
            move |event: &RetryEvent<'_, &'static str>| {
                events.lock().unwrap().push((event.attempt, event.next_delay));
            }
        },
    );

    let items: Vec<_> = futures::executor::block_on((&mut producer).collect());

    assert_eq!(items, vec![Err("offline")]);
    assert_eq!(producer.phase(), RetryPhase::Failed);
    assert_eq!(source.subscriptions(), 1);
    assert_eq!(*events.lock().unwrap(), vec![(1, None)]);
    assert!(logs_contain("no tokio runtime"));
}

#[test]
fn test_immediate_retry_needs_no_runtime() {
    let source = FlakySource::new(2, "flaky").then_emit(vec![5]);

    let items: Vec<_> =
        futures::executor::block_on(retry(source.factory(), RetryPolicy::immediate(2)).collect());

    assert_eq!(items, vec![Ok(5)]);
    assert_eq!(source.subscriptions(), 3);
}
