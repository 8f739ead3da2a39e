//! Backing services behind object-safe traits.
//!
//! Handlers only see these traits, so tests can swap in in-memory fakes.

pub mod kafka;
pub mod mongo;
pub mod redis;

use crate::error::{CacheError, PublishError, StoreError};
use async_trait::async_trait;
use serde_json::Value;

pub use self::kafka::KafkaPublisher;
pub use self::mongo::MongoStore;
pub use self::redis::RedisCache;

/// Collection read by `GET /api/data`.
pub const ITEMS_COLLECTION: &str = "items";

/// Read access to the document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns up to `limit` documents of the items collection as JSON.
    async fn fetch_items(&self, limit: i64) -> Result<Vec<Value>, StoreError>;

    fn is_connected(&self) -> bool;

    /// Closes the client. Later calls fail.
    async fn shutdown(&self);
}

/// JSON values stored under string keys.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Returns the decoded value, or `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores `value` JSON-encoded, expiring after `ttl_secs` when given.
    async fn set(&self, key: &str, value: &Value, ttl_secs: Option<u64>) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    fn is_connected(&self) -> bool;

    async fn shutdown(&self);
}

/// Destination for shipped log records.
#[async_trait]
pub trait LogPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError>;

    /// Flushes pending records and releases the client.
    async fn shutdown(&self);
}
