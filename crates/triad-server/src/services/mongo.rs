use super::{DocumentStore, ITEMS_COLLECTION};
use crate::error::StoreError;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// MongoDB-backed [`DocumentStore`].
pub struct MongoStore {
    client: Client,
    db: Database,
    connected: AtomicBool,
}

impl MongoStore {
    /// Connects and pings `database`, so an unreachable server fails here.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;

        info!(database, "Connected to MongoDB");
        Ok(Self {
            client,
            db,
            connected: AtomicBool::new(true),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn fetch_items(&self, limit: i64) -> Result<Vec<Value>, StoreError> {
        let cursor = self
            .db
            .collection::<Document>(ITEMS_COLLECTION)
            .find(doc! {})
            .limit(limit)
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        Ok(docs
            .into_iter()
            .map(|d| Bson::Document(d).into_relaxed_extjson())
            .collect())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn shutdown(&self) {
        self.connected.store(false, Ordering::Release);
        self.client.clone().shutdown().await;
        info!("Disconnected from MongoDB");
    }
}
