//! JSON file backend.
//!
//! The whole map lives in one JSON object: `{"-1001234": false, ...}`.
//! Every write is read-modify-write of the full object, written to a
//! sibling temp file and renamed over the original so a reader never sees
//! a half-written file.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::StoreError;

type FlagMap = HashMap<String, bool>;

/// Flat-file flag storage.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self, chat_id: i64) -> Result<Option<bool>, StoreError> {
        let map = self.read_map().await?;
        Ok(map.get(&chat_id.to_string()).copied())
    }

    pub async fn save(&self, chat_id: i64, enabled: bool) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(StoreError::Corrupt { path, source }) => {
                warn!("Replacing corrupt flag file {}: {}", path.display(), source);
                FlagMap::new()
            }
            Err(e) => return Err(e),
        };

        map.insert(chat_id.to_string(), enabled);
        self.write_map(&map).await?;
        debug!("Wrote {} flags to {}", map.len(), self.path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_map(&self) -> Result<FlagMap, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FlagMap::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_map(&self, map: &FlagMap) -> Result<(), StoreError> {
        let json = serde_json::to_vec(map).map_err(std::io::Error::from)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
