//! The bounded, flat-delay connect loop.

use crate::connection::Connection;
use crate::events::{AttemptOutcome, ConnectEvent};
use crate::policy::RetryPolicy;
use crate::state::StateHandle;
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tower::{Service, ServiceExt};
use triad_core::events::{EventListener, EventListeners, FnListener};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Establishes a connection to one backing service at startup.
///
/// Calls the establishing operation up to [`RetryPolicy::max_retries`] times,
/// one attempt at a time, sleeping [`RetryPolicy::delay`] between a failed
/// attempt and the next one. Exhausting every attempt is not an error: the
/// result is [`Connection::Fallback`] and the state becomes
/// [`ConnectionState::DegradedFallback`](crate::ConnectionState::DegradedFallback).
///
/// `connect` takes `&mut self`, so a connector can only ever drive one
/// sequence at a time.
pub struct RetryConnector {
    policy: RetryPolicy,
    name: String,
    listeners: EventListeners<ConnectEvent>,
    state: StateHandle,
}

impl RetryConnector {
    /// Creates a connector with the given policy and no listeners.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::builder().policy(policy).build()
    }

    /// Creates a new builder for a connector.
    pub fn builder() -> RetryConnectorBuilder {
        RetryConnectorBuilder::new()
    }

    /// Returns the policy applied to every sequence.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the connector name used in events, logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a handle observing this connector's state.
    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Runs a full connect sequence with `establish` as the attempt.
    ///
    /// Every call starts from scratch; a previous fallback outcome is not
    /// remembered.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use triad_connect::{Connection, RetryConnector, RetryPolicy};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let policy = RetryPolicy::new(3, Duration::from_millis(1)).unwrap();
    /// let mut connector = RetryConnector::builder()
    ///     .name("broker")
    ///     .policy(policy)
    ///     .build();
    ///
    /// let mut calls = 0;
    /// let outcome = connector
    ///     .connect(|| {
    ///         calls += 1;
    ///         let attempt = calls;
    ///         async move {
    ///             if attempt < 2 {
    ///                 Err("broker unavailable")
    ///             } else {
    ///                 Ok("producer")
    ///             }
    ///         }
    ///     })
    ///     .await;
    ///
    /// assert_eq!(outcome, Connection::Connected("producer"));
    /// # }
    /// ```
    pub async fn connect<F, Fut, C, E>(&mut self, mut establish: F) -> Connection<C>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<C, E>>,
        E: Display,
    {
        let mut sequence = self.begin();

        loop {
            let attempt = sequence.next_attempt(&self.state);
            match establish().await {
                Ok(conn) => {
                    self.finish_connected(&sequence, attempt);
                    return Connection::Connected(conn);
                }
                Err(error) => match self.attempt_failed(attempt, &error) {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => {
                        self.finish_fallback(&sequence, attempt);
                        return Connection::Fallback;
                    }
                },
            }
        }
    }

    /// Runs a full connect sequence through a service that produces connections.
    ///
    /// Each attempt waits for `maker` to become ready and then calls it with
    /// a clone of `target`, the shape of tower's `MakeService`. A readiness
    /// error counts as a failed attempt.
    pub async fn connect_service<S, T>(&mut self, maker: &mut S, target: T) -> Connection<S::Response>
    where
        S: Service<T>,
        S::Error: Display,
        T: Clone,
    {
        let mut sequence = self.begin();

        loop {
            let attempt = sequence.next_attempt(&self.state);
            let result = match maker.ready().await {
                Ok(ready) => ready.call(target.clone()).await,
                Err(error) => Err(error),
            };
            match result {
                Ok(conn) => {
                    self.finish_connected(&sequence, attempt);
                    return Connection::Connected(conn);
                }
                Err(error) => match self.attempt_failed(attempt, &error) {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => {
                        self.finish_fallback(&sequence, attempt);
                        return Connection::Fallback;
                    }
                },
            }
        }
    }

    fn begin(&self) -> Sequence {
        self.state.begin();
        self.publish_state();
        Sequence {
            started: tokio::time::Instant::now(),
            attempt: 0,
        }
    }

    /// Reports a failed attempt and returns the wait before the next one.
    fn attempt_failed<E: Display>(&self, attempt: u32, error: &E) -> Option<Duration> {
        let max_retries = self.policy.max_retries();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            connector = %self.name,
            attempt,
            max_retries,
            error = %error,
            "connection attempt {}/{} failed",
            attempt,
            max_retries
        );

        #[cfg(feature = "metrics")]
        counter!("connect_attempts_total", "connector" => self.name.clone(), "outcome" => "failure")
            .increment(1);

        self.listeners.emit(&ConnectEvent::Attempt {
            connector: self.name.clone(),
            timestamp: Instant::now(),
            attempt,
            max_retries,
            outcome: AttemptOutcome::Failed {
                error: error.to_string(),
            },
        });

        let delay = self.policy.delay_after(attempt)?;
        self.listeners.emit(&ConnectEvent::RetryScheduled {
            connector: self.name.clone(),
            timestamp: Instant::now(),
            next_attempt: attempt + 1,
            delay,
        });
        Some(delay)
    }

    fn finish_connected(&self, sequence: &Sequence, attempt: u32) {
        self.state.mark_connected();
        self.publish_state();
        let elapsed = sequence.started.elapsed();

        #[cfg(feature = "tracing")]
        tracing::info!(
            connector = %self.name,
            attempts = attempt,
            ?elapsed,
            "connected"
        );

        #[cfg(feature = "metrics")]
        {
            counter!("connect_attempts_total", "connector" => self.name.clone(), "outcome" => "success")
                .increment(1);
            counter!("connect_sequences_total", "connector" => self.name.clone(), "outcome" => "connected")
                .increment(1);
        }

        self.listeners.emit(&ConnectEvent::Attempt {
            connector: self.name.clone(),
            timestamp: Instant::now(),
            attempt,
            max_retries: self.policy.max_retries(),
            outcome: AttemptOutcome::Succeeded,
        });
        self.listeners.emit(&ConnectEvent::Connected {
            connector: self.name.clone(),
            timestamp: Instant::now(),
            attempts: attempt,
            elapsed,
        });
    }

    fn finish_fallback(&self, sequence: &Sequence, attempt: u32) {
        self.state.mark_fallback();
        self.publish_state();
        let elapsed = sequence.started.elapsed();

        #[cfg(feature = "tracing")]
        tracing::error!(
            connector = %self.name,
            attempts = attempt,
            ?elapsed,
            "all connection attempts failed, continuing in fallback mode"
        );

        #[cfg(feature = "metrics")]
        counter!("connect_sequences_total", "connector" => self.name.clone(), "outcome" => "fallback")
            .increment(1);

        self.listeners.emit(&ConnectEvent::Fallback {
            connector: self.name.clone(),
            timestamp: Instant::now(),
            attempts: attempt,
            elapsed,
        });
    }

    fn publish_state(&self) {
        #[cfg(feature = "metrics")]
        {
            let value = match self.state.state() {
                crate::ConnectionState::Disconnected => 0.0,
                crate::ConnectionState::Connected => 1.0,
                crate::ConnectionState::DegradedFallback => 2.0,
            };
            gauge!("connect_state", "connector" => self.name.clone()).set(value);
        }
    }
}

impl std::fmt::Debug for RetryConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryConnector")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("listeners", &self.listeners.len())
            .field("state", &self.state.state())
            .finish()
    }
}

/// Bookkeeping for one in-flight sequence.
struct Sequence {
    started: tokio::time::Instant,
    attempt: u32,
}

impl Sequence {
    fn next_attempt(&mut self, state: &StateHandle) -> u32 {
        self.attempt += 1;
        state.record_attempt(self.attempt);
        self.attempt
    }
}

/// Builder for [`RetryConnector`].
pub struct RetryConnectorBuilder {
    policy: RetryPolicy,
    name: String,
    listeners: EventListeners<ConnectEvent>,
}

impl RetryConnectorBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - policy: [`RetryPolicy::default`] (5 attempts, 2 seconds apart)
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "connect_attempts_total",
                    "Total number of connection attempts by outcome"
                );
                describe_counter!(
                    "connect_sequences_total",
                    "Total number of connect sequences by final outcome"
                );
                describe_gauge!(
                    "connect_state",
                    "Connector state (0 = disconnected, 1 = connected, 2 = degraded fallback)"
                );
            });
        }

        Self {
            policy: RetryPolicy::default(),
            name: "<unnamed>".to_string(),
            listeners: EventListeners::new(),
        }
    }

    /// Sets the retry policy.
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the name for this connector (used in events, logs and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a listener for every event.
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<ConnectEvent> + 'static,
    {
        self.listeners.add(listener);
        self
    }

    /// Registers a callback invoked after every attempt.
    ///
    /// # Callback Signature
    /// `Fn(u32, u32, &AttemptOutcome)` - the attempt number (1-indexed), the
    /// attempt ceiling and how the attempt went.
    ///
    /// # Example
    /// ```rust
    /// use triad_connect::RetryConnector;
    ///
    /// let connector = RetryConnector::builder()
    ///     .name("kafka")
    ///     .on_attempt(|attempt, max_retries, outcome| {
    ///         if !outcome.is_success() {
    ///             eprintln!("Kafka connection attempt {}/{} failed", attempt, max_retries);
    ///         }
    ///     })
    ///     .build();
    /// ```
    pub fn on_attempt<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, u32, &AttemptOutcome) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let ConnectEvent::Attempt {
                attempt,
                max_retries,
                outcome,
                ..
            } = event
            {
                f(*attempt, *max_retries, outcome);
            }
        }));
        self
    }

    /// Registers a callback invoked before each inter-attempt wait.
    ///
    /// Receives the number of the attempt about to be made and the delay.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, Duration) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let ConnectEvent::RetryScheduled {
                next_attempt,
                delay,
                ..
            } = event
            {
                f(*next_attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback invoked when a sequence ends connected.
    ///
    /// Receives the number of attempts it took.
    pub fn on_connected<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let ConnectEvent::Connected { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when a sequence ends in fallback mode.
    ///
    /// Receives the number of attempts made.
    pub fn on_fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let ConnectEvent::Fallback { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Builds the connector.
    pub fn build(self) -> RetryConnector {
        RetryConnector {
            policy: self.policy,
            name: self.name,
            listeners: self.listeners,
            state: StateHandle::new(),
        }
    }
}

impl Default for RetryConnectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
