//! Observable state across sequences.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use triad_connect::{Connection, ConnectionState, RetryConnector, RetryPolicy};

fn connector(max_retries: u32) -> RetryConnector {
    RetryConnector::builder()
        .name("kafka")
        .policy(RetryPolicy::new(max_retries, Duration::from_millis(50)).unwrap())
        .build()
}

#[test]
fn starts_disconnected() {
    let connector = connector(3);
    assert_eq!(connector.state().state(), ConnectionState::Disconnected);
    assert_eq!(connector.state().attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_after_fallback_runs_a_full_sequence() {
    let mut connector = connector(3);
    let up = Arc::new(AtomicBool::new(false));

    let u = Arc::clone(&up);
    let first = connector
        .connect(move || {
            let up = u.load(Ordering::SeqCst);
            async move { if up { Ok("live") } else { Err("down") } }
        })
        .await;
    assert_eq!(first, Connection::Fallback);
    assert_eq!(connector.state().state(), ConnectionState::DegradedFallback);
    assert_eq!(connector.state().attempts(), 3);

    up.store(true, Ordering::SeqCst);
    let u = Arc::clone(&up);
    let second = connector
        .connect(move || {
            let up = u.load(Ordering::SeqCst);
            async move { if up { Ok("live") } else { Err("down") } }
        })
        .await;
    assert_eq!(second, Connection::Connected("live"));
    assert_eq!(connector.state().state(), ConnectionState::Connected);
    assert_eq!(connector.state().attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn observer_sees_state_while_sequence_runs() {
    let mut connector = connector(3);
    let observer = connector.state().clone();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

    let (o, s) = (observer.clone(), Arc::clone(&seen));
    let _ = connector
        .connect(move || {
            s.lock().unwrap().push((o.state(), o.attempts()));
            async { Err::<(), _>("down") }
        })
        .await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (ConnectionState::Disconnected, 1),
            (ConnectionState::Disconnected, 2),
            (ConnectionState::Disconnected, 3),
        ]
    );
    assert_eq!(observer.state(), ConnectionState::DegradedFallback);
}

#[test]
fn outcome_state_matches_connector_state() {
    assert_eq!(
        Connection::Connected(()).state(),
        ConnectionState::Connected
    );
    assert_eq!(
        Connection::<()>::Fallback.state(),
        ConnectionState::DegradedFallback
    );
}
