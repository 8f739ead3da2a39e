use std::time::{Duration, Instant};
use triad_core::events::LifecycleEvent;

/// Result of a single connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The attempt produced a live connection.
    Succeeded,
    /// The attempt failed with the given error message.
    Failed {
        /// Rendered error from the establishing operation.
        error: String,
    },
}

impl AttemptOutcome {
    /// Returns true for a successful attempt.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Events emitted by a [`RetryConnector`](crate::RetryConnector).
#[derive(Debug, Clone)]
pub enum ConnectEvent {
    /// An attempt finished, successfully or not.
    Attempt {
        connector: String,
        timestamp: Instant,
        attempt: u32,
        max_retries: u32,
        outcome: AttemptOutcome,
    },
    /// A failed attempt will be followed by another one after `delay`.
    RetryScheduled {
        connector: String,
        timestamp: Instant,
        next_attempt: u32,
        delay: Duration,
    },
    /// The sequence ended with a live connection.
    Connected {
        connector: String,
        timestamp: Instant,
        attempts: u32,
        elapsed: Duration,
    },
    /// Every attempt failed; the sequence ended in fallback mode.
    Fallback {
        connector: String,
        timestamp: Instant,
        attempts: u32,
        elapsed: Duration,
    },
}

impl LifecycleEvent for ConnectEvent {
    fn kind(&self) -> &'static str {
        match self {
            ConnectEvent::Attempt { .. } => "attempt",
            ConnectEvent::RetryScheduled { .. } => "retry_scheduled",
            ConnectEvent::Connected { .. } => "connected",
            ConnectEvent::Fallback { .. } => "fallback",
        }
    }

    fn raised_at(&self) -> Instant {
        match self {
            ConnectEvent::Attempt { timestamp, .. }
            | ConnectEvent::RetryScheduled { timestamp, .. }
            | ConnectEvent::Connected { timestamp, .. }
            | ConnectEvent::Fallback { timestamp, .. } => *timestamp,
        }
    }

    fn service(&self) -> &str {
        match self {
            ConnectEvent::Attempt { connector, .. }
            | ConnectEvent::RetryScheduled { connector, .. }
            | ConnectEvent::Connected { connector, .. }
            | ConnectEvent::Fallback { connector, .. } => connector,
        }
    }
}
