//! Connector metrics regression tests

use super::helpers::*;
use serial_test::serial;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use triad_connect::{RetryConnector, RetryPolicy};

#[tokio::test]
#[serial]
async fn connect_metrics_exist() {
    init_recorder();

    let mut connector = RetryConnector::builder()
        .name("test_connect")
        .policy(RetryPolicy::new(3, Duration::from_millis(10)).unwrap())
        .build();

    let counter = Arc::new(AtomicU32::new(0));
    let c = Arc::clone(&counter);
    let _ = connector
        .connect(move || {
            let count = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 1 {
                    Err("refused")
                } else {
                    Ok(())
                }
            }
        })
        .await;

    assert_counter_exists("connect_attempts_total");
    assert_metric_has_label("connect_attempts_total", "connector", "test_connect");
    assert_metric_has_label("connect_attempts_total", "outcome", "failure");
    assert_metric_has_label("connect_attempts_total", "outcome", "success");

    assert_counter_exists("connect_sequences_total");
    assert_metric_has_label("connect_sequences_total", "outcome", "connected");

    assert_gauge_exists("connect_state");
    assert_metric_has_label("connect_state", "connector", "test_connect");
}

#[tokio::test]
#[serial]
async fn connect_fallback_metrics() {
    init_recorder();

    let mut connector = RetryConnector::builder()
        .name("fallback_connect")
        .policy(RetryPolicy::new(2, Duration::from_millis(10)).unwrap())
        .build();

    let _ = connector
        .connect(|| async { Err::<(), _>("refused") })
        .await;

    assert_metric_has_label("connect_sequences_total", "outcome", "fallback");
    assert_metric_has_label("connect_sequences_total", "connector", "fallback_connect");
}
