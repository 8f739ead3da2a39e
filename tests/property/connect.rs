//! Property tests for the connect sequence.
//!
//! Invariants tested:
//! - Success at attempt i <= n takes exactly i attempts and i - 1 delays
//! - Always failing takes exactly n attempts and n - 1 delays
//! - Total wait is exactly the sum of the scheduled delays
//! - Only a zero attempt ceiling is rejected

use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::runtime::Builder;
use triad_connect::{Connection, ConnectionState, RetryConnector, RetryPolicy};

/// Paused-clock runtime, so generated delays cost no real time.
fn paused_runtime() -> tokio::runtime::Runtime {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

struct Run {
    outcome: Connection<u32>,
    calls: u32,
    delays: u32,
    elapsed: Duration,
    state: ConnectionState,
}

/// Runs one sequence where the first `failures` attempts fail.
fn run(max_retries: u32, delay_ms: u64, failures: u32) -> Run {
    paused_runtime().block_on(async move {
        let calls = Arc::new(AtomicU32::new(0));
        let delays = Arc::new(AtomicU32::new(0));
        let d = Arc::clone(&delays);

        let mut connector = RetryConnector::builder()
            .policy(RetryPolicy::new(max_retries, Duration::from_millis(delay_ms)).unwrap())
            .on_retry(move |_, _| {
                d.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        let c = Arc::clone(&calls);
        let start = tokio::time::Instant::now();
        let outcome = connector
            .connect(move || {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                async move { if n <= failures { Err("refused") } else { Ok(n) } }
            })
            .await;

        Run {
            outcome,
            calls: calls.load(Ordering::SeqCst),
            delays: delays.load(Ordering::SeqCst),
            elapsed: start.elapsed(),
            state: connector.state().state(),
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: success at attempt i stops the sequence there
    #[test]
    fn success_stops_retrying(
        max_retries in 1u32..=10,
        succeed_at in 1u32..=10,
        delay_ms in 0u64..=500,
    ) {
        prop_assume!(succeed_at <= max_retries);

        let run = run(max_retries, delay_ms, succeed_at - 1);

        prop_assert_eq!(run.outcome, Connection::Connected(succeed_at));
        prop_assert_eq!(run.calls, succeed_at);
        prop_assert_eq!(run.delays, succeed_at - 1);
        prop_assert_eq!(run.state, ConnectionState::Connected);
    }

    /// Property: always failing uses every attempt, then falls back
    #[test]
    fn exhaustion_uses_every_attempt(
        max_retries in 1u32..=10,
        delay_ms in 0u64..=500,
    ) {
        let run = run(max_retries, delay_ms, u32::MAX);

        prop_assert_eq!(run.outcome, Connection::Fallback);
        prop_assert_eq!(run.calls, max_retries);
        prop_assert_eq!(run.delays, max_retries - 1);
        prop_assert_eq!(run.state, ConnectionState::DegradedFallback);
    }

    /// Property: total wait is the flat delay times the number of gaps
    #[test]
    fn wait_is_delay_times_gaps(
        max_retries in 1u32..=8,
        failures in 0u32..=8,
        delay_ms in 1u64..=200,
    ) {
        let run = run(max_retries, delay_ms, failures);

        let expected = Duration::from_millis(delay_ms) * run.delays;
        prop_assert!(run.elapsed >= expected);
        prop_assert!(run.elapsed < expected + Duration::from_millis(10));
    }

    /// Property: any positive attempt ceiling and delay is accepted
    #[test]
    fn only_zero_retries_is_rejected(
        max_retries in 0i64..=1000,
        delay_ms in 0i64..=100_000,
    ) {
        let result = RetryPolicy::from_raw(max_retries, delay_ms);
        prop_assert_eq!(result.is_ok(), max_retries >= 1);
    }
}
