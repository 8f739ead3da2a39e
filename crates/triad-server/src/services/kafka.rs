use super::LogPublisher;
use crate::config::KafkaSettings;
use crate::error::PublishError;
use async_trait::async_trait;
use rdkafka::config::{ClientConfig, RDKafkaLogLevel};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::time::Duration;
use tracing::{info, warn};

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka-backed [`LogPublisher`].
pub struct KafkaPublisher {
    producer: FutureProducer,
}

impl KafkaPublisher {
    /// Producer configuration for `settings`.
    ///
    /// The client's own delivery retries are librdkafka settings and run
    /// independently of the startup retry loop.
    pub fn client_config(settings: &KafkaSettings) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", settings.bootstrap_servers())
            .set("client.id", &settings.kafka_client_id)
            .set("message.send.max.retries", "8")
            .set("retry.backoff.ms", "300")
            .set("retry.backoff.max.ms", "30000")
            .set_log_level(RDKafkaLogLevel::Error);
        config
    }

    /// Creates a producer and checks the brokers answer for the log topic.
    ///
    /// Creating a producer never contacts the brokers, so a metadata request
    /// is what makes an unreachable cluster fail this attempt.
    pub async fn connect(settings: &KafkaSettings) -> Result<Self, PublishError> {
        let producer: FutureProducer = Self::client_config(settings).create()?;

        let metadata_client = producer.clone();
        let topic = settings.kafka_log_topic.clone();
        let timeout = settings.connect_timeout();
        tokio::task::spawn_blocking(move || {
            metadata_client
                .client()
                .fetch_metadata(Some(topic.as_str()), timeout)
                .map(|_| ())
        })
        .await
        .map_err(|e| PublishError::Unavailable(e.to_string()))??;

        info!(brokers = %settings.bootstrap_servers(), "Connected to Kafka");
        Ok(Self { producer })
    }
}

#[async_trait]
impl LogPublisher for KafkaPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);
        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map(|_| ())
            .map_err(|(e, _)| PublishError::Kafka(e))
    }

    async fn shutdown(&self) {
        let producer = self.producer.clone();
        match tokio::task::spawn_blocking(move || producer.flush(FLUSH_TIMEOUT)).await {
            Ok(Ok(())) => info!("Disconnected from Kafka"),
            Ok(Err(e)) => warn!(error = %e, "failed to flush pending log records"),
            Err(e) => warn!(error = %e, "flush task failed"),
        }
    }
}
