//! Event emission tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use triad_connect::{AttemptOutcome, ConnectEvent, RetryConnector, RetryPolicy};
use triad_core::{FnListener, LifecycleEvent};

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(100)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn event_order_for_retry_then_success() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let mut connector = RetryConnector::builder()
        .name("kafka")
        .policy(policy(3))
        .listener(FnListener::new(move |event: &ConnectEvent| {
            s.lock().unwrap().push(event.kind());
        }))
        .build();

    let calls = Arc::new(AtomicU32::new(0));
    let c = Arc::clone(&calls);
    let _ = connector
        .connect(move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move { if n == 0 { Err("refused") } else { Ok(()) } }
        })
        .await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["attempt", "retry_scheduled", "attempt", "connected"]
    );
}

#[tokio::test(start_paused = true)]
async fn event_order_for_exhaustion() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let mut connector = RetryConnector::builder()
        .policy(policy(2))
        .listener(FnListener::new(move |event: &ConnectEvent| {
            s.lock().unwrap().push(event.kind());
        }))
        .build();

    let _ = connector.connect(|| async { Err::<(), _>("refused") }).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["attempt", "retry_scheduled", "attempt", "fallback"]
    );
}

#[tokio::test(start_paused = true)]
async fn attempt_callback_reports_progress() {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&reports);
    let mut connector = RetryConnector::builder()
        .policy(policy(3))
        .on_attempt(move |attempt, max_retries, outcome| {
            r.lock()
                .unwrap()
                .push((attempt, max_retries, outcome.is_success()));
        })
        .build();

    let _ = connector.connect(|| async { Err::<(), _>("refused") }).await;

    assert_eq!(
        *reports.lock().unwrap(),
        vec![(1, 3, false), (2, 3, false), (3, 3, false)]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_attempt_carries_error_text() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&errors);
    let mut connector = RetryConnector::builder()
        .policy(policy(1))
        .listener(FnListener::new(move |event: &ConnectEvent| {
            if let ConnectEvent::Attempt {
                outcome: AttemptOutcome::Failed { error },
                ..
            } = event
            {
                e.lock().unwrap().push(error.clone());
            }
        }))
        .build();

    let _ = connector
        .connect(|| async { Err::<(), _>("connection refused") })
        .await;

    assert_eq!(*errors.lock().unwrap(), vec!["connection refused".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn retry_callback_receives_next_attempt_and_delay() {
    let retries = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&retries);
    let mut connector = RetryConnector::builder()
        .policy(policy(3))
        .on_retry(move |next, delay| r.lock().unwrap().push((next, delay)))
        .build();

    let _ = connector.connect(|| async { Err::<(), _>("refused") }).await;

    assert_eq!(
        *retries.lock().unwrap(),
        vec![
            (2, Duration::from_millis(100)),
            (3, Duration::from_millis(100)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn terminal_callbacks_fire_once() {
    let connected = Arc::new(AtomicU32::new(0));
    let fallback = Arc::new(AtomicU32::new(0));
    let (c, f) = (Arc::clone(&connected), Arc::clone(&fallback));
    let mut connector = RetryConnector::builder()
        .policy(policy(2))
        .on_connected(move |attempts| {
            assert_eq!(attempts, 1);
            c.fetch_add(1, Ordering::SeqCst);
        })
        .on_fallback(move |attempts| {
            assert_eq!(attempts, 2);
            f.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let _ = connector.connect(|| async { Ok::<_, &str>(()) }).await;
    let _ = connector.connect(|| async { Err::<(), _>("refused") }).await;

    assert_eq!(connected.load(Ordering::SeqCst), 1);
    assert_eq!(fallback.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn panicking_listener_does_not_stop_the_sequence() {
    let fallback = Arc::new(AtomicU32::new(0));
    let f = Arc::clone(&fallback);
    let mut connector = RetryConnector::builder()
        .policy(policy(2))
        .on_retry(|_, _| panic!("listener bug"))
        .on_fallback(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let outcome = connector.connect(|| async { Err::<(), _>("refused") }).await;

    assert!(outcome.is_fallback());
    assert_eq!(fallback.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn events_name_their_connector() {
    let sources = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&sources);
    let mut connector = RetryConnector::builder()
        .name("redis")
        .policy(policy(1))
        .listener(FnListener::new(move |event: &ConnectEvent| {
            s.lock().unwrap().push(event.service().to_string());
        }))
        .build();

    let _ = connector.connect(|| async { Ok::<_, &str>(()) }).await;

    assert_eq!(*sources.lock().unwrap(), vec!["redis", "redis"]);
}
