//! Application log records shipped to Kafka, or to the console without it.

use crate::services::LogPublisher;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use triad_connect::Connection;
use triad_core::{EventListeners, ServiceEvent};

/// Service name used in lifecycle events raised by the shipper.
const SERVICE: &str = "kafka";

/// Severity of a shipped record. Also the Kafka record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shipped log record, serialized as the Kafka record value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    /// RFC 3339, UTC, millisecond precision.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    pub fn new(level: LogLevel, message: impl Into<String>, metadata: Option<Value>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            metadata,
        }
    }
}

/// Where a record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Published,
    Console,
}

/// Ships application log records.
///
/// With a live publisher every record goes to the log topic, keyed by level.
/// In fallback mode, or when a publish fails, the record is written to the
/// process's own diagnostics instead. Shipping never fails the caller; a
/// failed publish raises a `degraded` service event.
pub struct LogShipper {
    sink: Connection<Arc<dyn LogPublisher>>,
    topic: String,
    events: EventListeners<ServiceEvent>,
}

impl LogShipper {
    pub fn new(sink: Connection<Arc<dyn LogPublisher>>, topic: impl Into<String>) -> Self {
        Self {
            sink,
            topic: topic.into(),
            events: EventListeners::new(),
        }
    }

    /// Listeners told when a publish fails and a record falls back.
    pub fn with_events(mut self, events: EventListeners<ServiceEvent>) -> Self {
        self.events = events;
        self
    }

    /// A shipper that only writes to the console.
    pub fn console() -> Self {
        Self::new(Connection::Fallback, String::new())
    }

    /// True when records go to Kafka.
    pub fn is_connected(&self) -> bool {
        self.sink.is_connected()
    }

    pub async fn info(&self, message: &str, metadata: Option<Value>) -> Delivery {
        self.ship(&LogRecord::new(LogLevel::Info, message, metadata)).await
    }

    pub async fn warn(&self, message: &str, metadata: Option<Value>) -> Delivery {
        self.ship(&LogRecord::new(LogLevel::Warn, message, metadata)).await
    }

    pub async fn error(&self, message: &str, metadata: Option<Value>) -> Delivery {
        self.ship(&LogRecord::new(LogLevel::Error, message, metadata)).await
    }

    pub async fn debug(&self, message: &str, metadata: Option<Value>) -> Delivery {
        self.ship(&LogRecord::new(LogLevel::Debug, message, metadata)).await
    }

    pub async fn ship(&self, record: &LogRecord) -> Delivery {
        match &self.sink {
            Connection::Connected(publisher) => match self.publish(&**publisher, record).await {
                Ok(()) => Delivery::Published,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to send log to Kafka");
                    self.events
                        .emit(&ServiceEvent::degraded(SERVICE, format!("publish failed: {e}")));
                    write_console(record);
                    Delivery::Console
                }
            },
            Connection::Fallback => {
                write_console(record);
                Delivery::Console
            }
        }
    }

    async fn publish(
        &self,
        publisher: &dyn LogPublisher,
        record: &LogRecord,
    ) -> Result<(), crate::error::PublishError> {
        let payload = serde_json::to_string(record)?;
        publisher
            .publish(&self.topic, record.level.as_str(), &payload)
            .await
    }

    /// Releases the publisher, if any.
    pub async fn shutdown(&self) {
        if let Connection::Connected(publisher) = &self.sink {
            publisher.shutdown().await;
        }
    }
}

impl fmt::Debug for LogShipper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogShipper")
            .field("connected", &self.is_connected())
            .field("topic", &self.topic)
            .finish()
    }
}

fn write_console(record: &LogRecord) {
    let metadata = record
        .metadata
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_default();

    match record.level {
        LogLevel::Info => tracing::info!(target: "triad::log", %metadata, "{}", record.message),
        LogLevel::Warn => tracing::warn!(target: "triad::log", %metadata, "{}", record.message),
        LogLevel::Error => tracing::error!(target: "triad::log", %metadata, "{}", record.message),
        LogLevel::Debug => tracing::debug!(target: "triad::log", %metadata, "{}", record.message),
    }
}
