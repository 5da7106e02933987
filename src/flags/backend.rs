//! Durable storage adapters for `FlagStore`.

use std::path::PathBuf;

use thiserror::Error;

use super::json_file::JsonFileBackend;
use crate::database::FlagRepository;

/// Failure of a durable flag backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("flag file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("flag file {} is not a valid JSON map: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("flag collection unavailable: {0:#}")]
    Database(anyhow::Error),
}

/// Where a `FlagStore` mirrors its writes.
pub enum FlagBackend {
    /// Overlay only, nothing survives a restart.
    Memory,
    /// One JSON object holding every chat's flag.
    JsonFile(JsonFileBackend),
    /// One MongoDB document per chat.
    Mongo(FlagRepository),
}

impl FlagBackend {
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::JsonFile(JsonFileBackend::new(path))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::JsonFile(_) => "json",
            Self::Mongo(_) => "mongo",
        }
    }

    pub(super) async fn load(&self, chat_id: i64) -> Result<Option<bool>, StoreError> {
        match self {
            Self::Memory => Ok(None),
            Self::JsonFile(file) => file.load(chat_id).await,
            Self::Mongo(repo) => repo.get(chat_id).await.map_err(StoreError::Database),
        }
    }

    pub(super) async fn save(&self, chat_id: i64, enabled: bool) -> Result<(), StoreError> {
        match self {
            Self::Memory => Ok(()),
            Self::JsonFile(file) => file.save(chat_id, enabled).await,
            Self::Mongo(repo) => repo.set(chat_id, enabled).await.map_err(StoreError::Database),
        }
    }

    pub(super) async fn clear(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory => Ok(()),
            Self::JsonFile(file) => file.clear().await,
            Self::Mongo(repo) => repo
                .clear()
                .await
                .map(|_| ())
                .map_err(StoreError::Database),
        }
    }
}

impl std::fmt::Debug for FlagBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JsonFile(file) => f
                .debug_tuple("JsonFile")
                .field(&file.path())
                .finish(),
            other => f.write_str(other.kind()),
        }
    }
}
