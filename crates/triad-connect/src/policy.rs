//! Retry policy for establishing a connection.

use crate::error::ConfigurationError;
use std::time::Duration;

/// How many times to try a connection and how long to wait in between.
///
/// The wait is flat: every gap between two attempts is exactly `delay`,
/// regardless of how many attempts have already failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts.
    pub const DEFAULT_MAX_RETRIES: u32 = 5;

    /// Default delay between attempts.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

    /// Creates a validated policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use triad_connect::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(3, Duration::from_millis(100)).unwrap();
    /// assert_eq!(policy.max_retries(), 3);
    ///
    /// assert!(RetryPolicy::new(0, Duration::from_millis(100)).is_err());
    /// ```
    pub fn new(max_retries: u32, delay: Duration) -> Result<Self, ConfigurationError> {
        if max_retries < 1 {
            return Err(ConfigurationError::InvalidMaxRetries(i64::from(max_retries)));
        }
        Ok(Self { max_retries, delay })
    }

    /// Creates a policy from raw integers, as read from the environment or CLI.
    ///
    /// # Examples
    ///
    /// ```
    /// use triad_connect::{ConfigurationError, RetryPolicy};
    ///
    /// assert!(RetryPolicy::from_raw(5, 2000).is_ok());
    /// assert_eq!(
    ///     RetryPolicy::from_raw(3, -1),
    ///     Err(ConfigurationError::NegativeDelay(-1))
    /// );
    /// ```
    pub fn from_raw(max_retries: i64, delay_ms: i64) -> Result<Self, ConfigurationError> {
        let max = u32::try_from(max_retries)
            .ok()
            .filter(|max| *max >= 1)
            .ok_or(ConfigurationError::InvalidMaxRetries(max_retries))?;
        let delay_ms =
            u64::try_from(delay_ms).map_err(|_| ConfigurationError::NegativeDelay(delay_ms))?;
        Self::new(max, Duration::from_millis(delay_ms))
    }

    /// Creates a new builder for a retry policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Returns the maximum number of attempts, including the first one.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the flat delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the wait that follows a failure of `attempt` (1-indexed).
    ///
    /// `None` once `attempt` is the last permitted one: the sequence ends
    /// without waiting.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt < self.max_retries {
            Some(self.delay)
        } else {
            None
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            delay: Self::DEFAULT_DELAY,
        }
    }
}

/// Builder for constructing a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicyBuilder {
    /// Creates a new builder with default settings.
    ///
    /// Defaults:
    /// - max_retries: 5
    /// - delay: 2 seconds
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of attempts.
    ///
    /// This includes the initial attempt, so `max_retries(3)` means one
    /// attempt plus two retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the flat delay between attempts.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the flat delay between attempts in milliseconds.
    pub fn delay_ms(self, delay_ms: u64) -> Self {
        self.delay(Duration::from_millis(delay_ms))
    }

    /// Validates and builds the policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use triad_connect::RetryPolicy;
    ///
    /// let policy = RetryPolicy::builder()
    ///     .max_retries(3)
    ///     .delay(Duration::from_millis(100))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(policy.delay(), Duration::from_millis(100));
    /// ```
    pub fn build(self) -> Result<RetryPolicy, ConfigurationError> {
        RetryPolicy::new(self.max_retries, self.delay)
    }
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self {
            max_retries: RetryPolicy::DEFAULT_MAX_RETRIES,
            delay: RetryPolicy::DEFAULT_DELAY,
        }
    }
}
