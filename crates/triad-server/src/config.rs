//! Process configuration, read from flags with environment fallbacks.
//!
//! A `.env` file in the working directory is loaded by each binary before
//! parsing, so every setting can live there instead of the real environment.

use clap::{Args, Parser, ValueEnum};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use triad_connect::{ConfigurationError, RetryPolicy};

/// Database used when the MongoDB URI does not name one.
pub const DEFAULT_DATABASE: &str = "myapp";

/// Output format for the process's own diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Settings for the HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "triad-server", about = "HTTP service backed by MongoDB, Redis and Kafka")]
pub struct Settings {
    /// Deployment environment name, reported at startup.
    #[arg(long = "environment", env = "NODE_ENV", default_value = "development")]
    pub environment: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[command(flatten)]
    pub mongo: MongoSettings,

    /// Redis connection URL.
    #[arg(long, env = "REDIS_URL", default_value = "redis://localhost:6379")]
    pub redis_url: String,

    #[command(flatten)]
    pub kafka: KafkaSettings,

    /// Filter for diagnostics when `RUST_LOG` is unset.
    #[arg(long, env = "TRIAD_LOG", default_value = "info")]
    pub log_filter: String,

    /// Diagnostics output format.
    #[arg(long, env = "TRIAD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Settings {
    /// Address the server binds to (all interfaces).
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

/// MongoDB connection settings, shared by the server and the migration tool.
#[derive(Debug, Clone, Args)]
pub struct MongoSettings {
    /// MongoDB connection URI; its path names the database.
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017/myapp")]
    pub mongodb_uri: String,
}

impl MongoSettings {
    /// Database named by the URI path, or [`DEFAULT_DATABASE`].
    pub fn database(&self) -> String {
        database_from_uri(&self.mongodb_uri).unwrap_or_else(|| DEFAULT_DATABASE.to_string())
    }
}

/// Kafka settings, shared by the server and the log viewer.
#[derive(Debug, Clone, Args)]
pub struct KafkaSettings {
    /// Comma separated bootstrap brokers.
    #[arg(long, env = "KAFKA_BROKERS", value_delimiter = ',', default_value = "localhost:9093")]
    pub kafka_brokers: Vec<String>,

    /// Client id reported to the brokers.
    #[arg(long, env = "KAFKA_CLIENT_ID", default_value = "express-app")]
    pub kafka_client_id: String,

    /// Topic that receives log records.
    #[arg(long, env = "KAFKA_LOG_TOPIC", default_value = "server-logs")]
    pub kafka_log_topic: String,

    /// Attempts made to reach Kafka at startup.
    #[arg(long, env = "KAFKA_CONNECT_RETRIES", default_value_t = 5, allow_negative_numbers = true)]
    pub kafka_connect_retries: i64,

    /// Wait between two startup attempts, in milliseconds.
    #[arg(long, env = "KAFKA_CONNECT_DELAY_MS", default_value_t = 2000, allow_negative_numbers = true)]
    pub kafka_connect_delay_ms: i64,

    /// How long one attempt waits for broker metadata, in milliseconds.
    #[arg(long, env = "KAFKA_CONNECT_TIMEOUT_MS", default_value_t = 5000)]
    pub kafka_connect_timeout_ms: u64,
}

impl KafkaSettings {
    /// Brokers in `bootstrap.servers` form.
    pub fn bootstrap_servers(&self) -> String {
        self.kafka_brokers
            .iter()
            .map(|broker| broker.trim())
            .filter(|broker| !broker.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Validated startup retry policy.
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigurationError> {
        RetryPolicy::from_raw(self.kafka_connect_retries, self.kafka_connect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.kafka_connect_timeout_ms)
    }
}

/// Extracts the database name from a `mongodb://` or `mongodb+srv://` URI.
fn database_from_uri(uri: &str) -> Option<String> {
    let (_, rest) = uri.split_once("://")?;
    let (_, path) = rest.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
