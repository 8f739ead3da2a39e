//! Using a tower `Service` as the connection maker.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;
use triad_connect::{Connection, RetryConnector, RetryPolicy};

#[derive(Debug, Clone, PartialEq)]
struct Session {
    addr: String,
    id: u32,
}

#[derive(Debug)]
struct DialError(&'static str);

impl std::fmt::Display for DialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dials an address; the first `refusals` calls fail.
struct Dialer {
    calls: Arc<AtomicU32>,
    refusals: u32,
    not_ready: bool,
}

impl Service<String> for Dialer {
    type Response = Session;
    type Error = DialError;
    type Future = BoxFuture<'static, Result<Session, DialError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.not_ready {
            Poll::Ready(Err(DialError("dialer closed")))
        } else {
            Poll::Ready(Ok(()))
        }
    }

    fn call(&mut self, addr: String) -> Self::Future {
        let id = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let refused = id <= self.refusals;
        Box::pin(async move {
            if refused {
                Err(DialError("connection refused"))
            } else {
                Ok(Session { addr, id })
            }
        })
    }
}

fn connector(max_retries: u32) -> RetryConnector {
    RetryConnector::new(RetryPolicy::new(max_retries, Duration::from_millis(100)).unwrap())
}

#[tokio::test(start_paused = true)]
async fn retries_the_maker_until_it_connects() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut dialer = Dialer {
        calls: Arc::clone(&calls),
        refusals: 2,
        not_ready: false,
    };

    let outcome = connector(3)
        .connect_service(&mut dialer, "localhost:9093".to_string())
        .await;

    assert_eq!(
        outcome,
        Connection::Connected(Session {
            addr: "localhost:9093".to_string(),
            id: 3,
        })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn readiness_failure_counts_as_an_attempt() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut dialer = Dialer {
        calls: Arc::clone(&calls),
        refusals: 0,
        not_ready: true,
    };
    let mut connector = connector(4);

    let outcome = connector
        .connect_service(&mut dialer, "localhost:9093".to_string())
        .await;

    assert_eq!(outcome, Connection::Fallback);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(connector.state().attempts(), 4);
}
