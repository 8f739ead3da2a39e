use super::KeyValueCache;
use crate::error::CacheError;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Redis-backed [`KeyValueCache`] over one multiplexed connection.
pub struct RedisCache {
    conn: MultiplexedConnection,
    connected: AtomicBool,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_tokio_connection().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;

        info!("Connected to Redis");
        Ok(Self {
            conn,
            connected: AtomicBool::new(true),
        })
    }

    fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        if self.is_connected() {
            Ok(self.conn.clone())
        } else {
            Err(CacheError::Unavailable("Redis connection closed".to_string()))
        }
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let raw: Option<String> = self.connection()?.get(key).await?;
        Ok(raw.map(|s| serde_json::from_str(&s)).transpose()?)
    }

    async fn set(&self, key: &str, value: &Value, ttl_secs: Option<u64>) -> Result<(), CacheError> {
        let encoded = serde_json::to_string(value)?;
        let mut conn = self.connection()?;
        match ttl_secs {
            Some(secs) if secs > 0 => {
                let _: () = conn.set_ex(key, encoded, secs).await?;
            }
            _ => {
                let _: () = conn.set(key, encoded).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let _: () = self.connection()?.del(key).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let found: bool = self.connection()?.exists(key).await?;
        Ok(found)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn shutdown(&self) {
        self.connected.store(false, Ordering::Release);
        info!("Disconnected from Redis");
    }
}
