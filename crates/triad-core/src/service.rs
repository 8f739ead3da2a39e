//! Lifecycle of the backing services a process depends on.

use crate::events::LifecycleEvent;
use std::fmt;
use std::time::Instant;

/// What happened to a backing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceChange {
    /// A live client is ready for use.
    Connected,
    /// The service could not be reached. Required services abort startup.
    Unavailable { error: String },
    /// The service is unreachable and a local substitute is used instead.
    Degraded { reason: String },
    /// The client was released during shutdown.
    Closed,
}

/// A [`ServiceChange`] for one named service.
#[derive(Debug, Clone)]
pub struct ServiceEvent {
    service: String,
    raised_at: Instant,
    change: ServiceChange,
}

impl ServiceEvent {
    pub fn new(service: impl Into<String>, change: ServiceChange) -> Self {
        Self {
            service: service.into(),
            raised_at: Instant::now(),
            change,
        }
    }

    pub fn connected(service: impl Into<String>) -> Self {
        Self::new(service, ServiceChange::Connected)
    }

    pub fn unavailable(service: impl Into<String>, error: impl fmt::Display) -> Self {
        Self::new(
            service,
            ServiceChange::Unavailable {
                error: error.to_string(),
            },
        )
    }

    pub fn degraded(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            service,
            ServiceChange::Degraded {
                reason: reason.into(),
            },
        )
    }

    pub fn closed(service: impl Into<String>) -> Self {
        Self::new(service, ServiceChange::Closed)
    }

    pub fn change(&self) -> &ServiceChange {
        &self.change
    }
}

impl LifecycleEvent for ServiceEvent {
    fn kind(&self) -> &'static str {
        match self.change {
            ServiceChange::Connected => "connected",
            ServiceChange::Unavailable { .. } => "unavailable",
            ServiceChange::Degraded { .. } => "degraded",
            ServiceChange::Closed => "closed",
        }
    }

    fn service(&self) -> &str {
        &self.service
    }

    fn raised_at(&self) -> Instant {
        self.raised_at
    }
}
