//! Schema migrations for the document database.
//!
//! Applied migrations are recorded in the `changelog` collection as
//! `{ fileName, appliedAt }`, one document per migration.

use crate::services::ITEMS_COLLECTION;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::{Collection, Database, IndexModel};
use thiserror::Error;
use tracing::info;

/// Collection holding applied migrations.
pub const CHANGELOG_COLLECTION: &str = "changelog";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The changelog names a migration this build does not know.
    #[error("unknown migration in changelog: {0}")]
    Unknown(String),
}

/// One reversible schema change applied to `T`.
#[async_trait]
pub trait Migration<T = Database>: Send + Sync {
    /// Unique, sortable name recorded in the changelog.
    fn file_name(&self) -> &'static str;

    async fn up(&self, target: &T) -> Result<(), MigrationError>;

    async fn down(&self, target: &T) -> Result<(), MigrationError>;
}

/// Record of applied migrations.
#[async_trait]
pub trait Changelog: Send + Sync {
    /// When `file_name` was applied, or `None` while it is pending.
    async fn applied_at(&self, file_name: &str) -> Result<Option<DateTime<Utc>>, MigrationError>;

    /// The most recently applied migration.
    async fn last_applied(&self) -> Result<Option<String>, MigrationError>;

    async fn record(&self, file_name: &str, applied_at: DateTime<Utc>) -> Result<(), MigrationError>;

    async fn remove(&self, file_name: &str) -> Result<(), MigrationError>;
}

/// The `changelog` collection.
pub struct MongoChangelog {
    collection: Collection<Document>,
}

impl MongoChangelog {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(CHANGELOG_COLLECTION),
        }
    }
}

#[async_trait]
impl Changelog for MongoChangelog {
    async fn applied_at(&self, file_name: &str) -> Result<Option<DateTime<Utc>>, MigrationError> {
        let entry = self
            .collection
            .find_one(doc! { "fileName": file_name })
            .await?;
        Ok(entry
            .and_then(|e| e.get_datetime("appliedAt").ok().copied())
            .and_then(|at| DateTime::from_timestamp_millis(at.timestamp_millis())))
    }

    async fn last_applied(&self) -> Result<Option<String>, MigrationError> {
        let entries: Vec<Document> = self
            .collection
            .find(doc! {})
            .sort(doc! { "appliedAt": -1 })
            .limit(1)
            .await?
            .try_collect()
            .await?;

        let Some(last) = entries.into_iter().next() else {
            return Ok(None);
        };
        let name = last
            .get_str("fileName")
            .map_err(|_| MigrationError::Unknown(last.to_string()))?;
        Ok(Some(name.to_string()))
    }

    async fn record(&self, file_name: &str, applied_at: DateTime<Utc>) -> Result<(), MigrationError> {
        self.collection
            .insert_one(doc! {
                "fileName": file_name,
                "appliedAt": bson::DateTime::from_millis(applied_at.timestamp_millis()),
            })
            .await?;
        Ok(())
    }

    async fn remove(&self, file_name: &str) -> Result<(), MigrationError> {
        self.collection
            .delete_one(doc! { "fileName": file_name })
            .await?;
        Ok(())
    }
}

/// Creates the items collection with its indexes and two sample items.
pub struct InitialSetup;

#[async_trait]
impl Migration for InitialSetup {
    fn file_name(&self) -> &'static str {
        "20250127000001-initial-setup"
    }

    async fn up(&self, db: &Database) -> Result<(), MigrationError> {
        db.create_collection(ITEMS_COLLECTION).await?;

        let items = db.collection::<Document>(ITEMS_COLLECTION);
        items
            .create_index(IndexModel::builder().keys(doc! { "createdAt": -1 }).build())
            .await?;
        items
            .create_index(IndexModel::builder().keys(doc! { "updatedAt": -1 }).build())
            .await?;

        let now = bson::DateTime::now();
        items
            .insert_many(vec![
                doc! {
                    "name": "Sample Item 1",
                    "description": "This is a sample item",
                    "createdAt": now,
                    "updatedAt": now,
                },
                doc! {
                    "name": "Sample Item 2",
                    "description": "Another sample item",
                    "createdAt": now,
                    "updatedAt": now,
                },
            ])
            .await?;

        info!("Initial setup migration completed");
        Ok(())
    }

    async fn down(&self, db: &Database) -> Result<(), MigrationError> {
        db.collection::<Document>(ITEMS_COLLECTION).drop().await?;
        info!("Initial setup migration rolled back");
        Ok(())
    }
}

/// Every known migration, in application order.
pub fn all() -> Vec<Box<dyn Migration>> {
    vec![Box::new(InitialSetup)]
}

/// Whether a migration has been applied, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub file_name: &'static str,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Applies and reverts migrations against `target`, tracking them in `L`.
pub struct Migrator<T = Database, L = MongoChangelog> {
    target: T,
    changelog: L,
    migrations: Vec<Box<dyn Migration<T>>>,
}

impl Migrator {
    /// A migrator recording into the database's own `changelog` collection.
    pub fn for_database(db: Database, migrations: Vec<Box<dyn Migration>>) -> Self {
        let changelog = MongoChangelog::new(&db);
        Self::new(db, changelog, migrations)
    }
}

impl<T: Sync, L: Changelog> Migrator<T, L> {
    pub fn new(target: T, changelog: L, migrations: Vec<Box<dyn Migration<T>>>) -> Self {
        Self {
            target,
            changelog,
            migrations,
        }
    }

    /// Lists every known migration with its applied time.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>, MigrationError> {
        let mut statuses = Vec::with_capacity(self.migrations.len());
        for migration in &self.migrations {
            statuses.push(MigrationStatus {
                file_name: migration.file_name(),
                applied_at: self.changelog.applied_at(migration.file_name()).await?,
            });
        }
        Ok(statuses)
    }

    /// Applies every pending migration in order. Returns the names applied.
    pub async fn up(&self) -> Result<Vec<&'static str>, MigrationError> {
        let mut applied = Vec::new();
        for migration in &self.migrations {
            let name = migration.file_name();
            if self.changelog.applied_at(name).await?.is_some() {
                continue;
            }

            migration.up(&self.target).await?;
            self.changelog.record(name, Utc::now()).await?;
            info!(migration = name, "MIGRATED UP");
            applied.push(name);
        }
        Ok(applied)
    }

    /// Reverts the most recently applied migration, if any.
    pub async fn down(&self) -> Result<Option<&'static str>, MigrationError> {
        let Some(name) = self.changelog.last_applied().await? else {
            return Ok(None);
        };
        let migration = self
            .migrations
            .iter()
            .find(|m| m.file_name() == name)
            .ok_or_else(|| MigrationError::Unknown(name.clone()))?;

        migration.down(&self.target).await?;
        self.changelog.remove(&name).await?;
        info!(migration = %name, "MIGRATED DOWN");
        Ok(Some(migration.file_name()))
    }
}
