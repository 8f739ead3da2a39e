//! Error types for connection retry configuration.

use thiserror::Error;

/// Raised when a retry policy is built from values the connect loop cannot honour.
///
/// This is the only failure `triad-connect` surfaces to callers: it is
/// returned before any connection attempt is made. Failed attempts and
/// exhausted retries are reported through events instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// `max_retries` was below one.
    #[error("max_retries must be at least 1, got {0}")]
    InvalidMaxRetries(i64),

    /// The inter-attempt delay was negative.
    #[error("retry delay must not be negative, got {0}ms")]
    NegativeDelay(i64),
}
