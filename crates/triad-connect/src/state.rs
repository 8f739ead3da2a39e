//! Connection state tracking for a connect sequence.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// Where a connector stands.
///
/// Within one sequence the state only moves forward:
/// `Disconnected -> Connected` or `Disconnected -> DegradedFallback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No live connection yet; a sequence may be in flight.
    Disconnected,

    /// An attempt succeeded and a live connection was handed out.
    Connected,

    /// Every attempt failed; dependents run in fallback mode.
    DegradedFallback,
}

impl ConnectionState {
    /// Returns a stable lowercase label, used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::DegradedFallback => "degraded_fallback",
        }
    }

    fn encode(self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connected => 1,
            Self::DegradedFallback => 2,
        }
    }

    fn decode(encoded: u8) -> Self {
        match encoded {
            0 => Self::Disconnected,
            1 => Self::Connected,
            _ => Self::DegradedFallback,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, read-mostly view of a connector's state.
///
/// Clones observe the same state. Only the owning connector writes to it;
/// anyone else (a health endpoint, a test) just reads.
#[derive(Clone)]
pub struct StateHandle {
    state: Arc<AtomicU8>,
    attempts: Arc<AtomicU32>,
}

impl StateHandle {
    /// Creates a handle in the `Disconnected` state.
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected.encode())),
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::decode(self.state.load(Ordering::Acquire))
    }

    /// Returns true when the last sequence ended with a live connection.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Returns the number of attempts made by the current or last sequence.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Resets to `Disconnected` with no attempts, at the start of a sequence.
    pub(crate) fn begin(&self) {
        self.set_state(ConnectionState::Disconnected);
        self.attempts.store(0, Ordering::Release);
    }

    pub(crate) fn record_attempt(&self, attempt: u32) {
        self.attempts.store(attempt, Ordering::Release);
    }

    pub(crate) fn mark_connected(&self) {
        self.set_state(ConnectionState::Connected);
    }

    pub(crate) fn mark_fallback(&self) {
        self.set_state(ConnectionState::DegradedFallback);
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state.encode(), Ordering::Release);
    }
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateHandle")
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .finish()
    }
}
