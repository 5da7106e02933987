//! Feature flag repository.
//!
//! One collection per feature, one document per chat. Reads and writes go
//! straight to MongoDB; the in-process overlay lives in `crate::flags`.

use anyhow::Result;
use mongodb::bson::doc;
use mongodb::Collection;
use tracing::debug;

use crate::database::models::FlagRecord;
use crate::database::Database;

/// Repository for per-chat boolean flags.
#[derive(Clone)]
pub struct FlagRepository {
    collection: Collection<FlagRecord>,
}

impl FlagRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }

    /// Get the stored flag for a chat, `None` if no document exists.
    pub async fn get(&self, chat_id: i64) -> Result<Option<bool>> {
        let filter = doc! { "chat_id": chat_id };
        let result = self.collection.find_one(filter).await?;
        debug!("DB get flag for {}: {:?}", chat_id, result.as_ref().map(|r| r.enabled));
        Ok(result.map(|record| record.enabled))
    }

    /// Save a flag (upsert).
    pub async fn set(&self, chat_id: i64, enabled: bool) -> Result<()> {
        let filter = doc! { "chat_id": chat_id };
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(filter, FlagRecord::new(chat_id, enabled))
            .with_options(options)
            .await?;

        debug!("Saved flag {} for chat {}", enabled, chat_id);
        Ok(())
    }

    /// Delete every document in the collection.
    pub async fn clear(&self) -> Result<u64> {
        let result = self.collection.delete_many(doc! {}).await?;
        debug!("Cleared {} flag documents", result.deleted_count);
        Ok(result.deleted_count)
    }
}
