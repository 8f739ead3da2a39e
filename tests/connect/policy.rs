//! Policy validation happens before any attempt is made.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use triad_connect::{ConfigurationError, RetryConnector, RetryPolicy};

#[test]
fn zero_retries_is_a_configuration_error() {
    let result = RetryPolicy::new(0, Duration::from_millis(100));
    assert_eq!(result, Err(ConfigurationError::InvalidMaxRetries(0)));
}

#[test]
fn negative_values_are_configuration_errors() {
    assert_eq!(
        RetryPolicy::from_raw(-1, 100),
        Err(ConfigurationError::InvalidMaxRetries(-1))
    );
    assert_eq!(
        RetryPolicy::from_raw(5, -2000),
        Err(ConfigurationError::NegativeDelay(-2000))
    );
}

#[tokio::test]
async fn invalid_policy_never_calls_the_operation() {
    let calls = Arc::new(AtomicU32::new(0));

    // The policy cannot be built, so there is no connector to run.
    let outcome = match RetryPolicy::from_raw(0, 100) {
        Ok(policy) => {
            let c = Arc::clone(&calls);
            let mut connector = RetryConnector::new(policy);
            Some(
                connector
                    .connect(move || {
                        c.fetch_add(1, Ordering::SeqCst);
                        async { Ok::<_, &str>(()) }
                    })
                    .await,
            )
        }
        Err(_) => None,
    };

    assert!(outcome.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn defaults_are_five_attempts_two_seconds_apart() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries(), 5);
    assert_eq!(policy.delay(), Duration::from_millis(2000));

    let connector = RetryConnector::builder().build();
    assert_eq!(connector.policy(), &policy);
}

#[test]
fn builder_accepts_millisecond_delay() {
    let policy = RetryPolicy::builder()
        .max_retries(2)
        .delay_ms(250)
        .build()
        .unwrap();
    assert_eq!(policy.delay(), Duration::from_millis(250));
    assert_eq!(policy.delay_after(1), Some(Duration::from_millis(250)));
    assert_eq!(policy.delay_after(2), None);
}
