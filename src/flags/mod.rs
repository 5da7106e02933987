//! Per-chat boolean feature flags.
//!
//! A `FlagStore` maps a chat id to an on/off switch for one feature
//! (auto reactions, mention reactions). Reads consult an in-memory overlay
//! first and fall back to the durable backend; writes update the overlay and
//! then write through before returning.
//!
//! ## Encoding
//!
//! Every backend stores the flag value itself. A chat with no record gets
//! the store's configured default. Enabling and disabling both upsert a
//! record; only `clear` removes records.
//!
//! ## Failure policy
//!
//! Backend failures never reach the caller. A failed read answers with the
//! default (and is not remembered, so the next read retries). A failed write
//! still lands in the overlay, so the process keeps honoring it until restart.

mod backend;
mod json_file;

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

pub use backend::{FlagBackend, StoreError};

/// Overlay plus durable backend for one feature.
#[derive(Debug)]
pub struct FlagStore {
    feature: &'static str,
    default: bool,
    overlay: DashMap<i64, bool>,
    /// Bumped by `clear`; a load that started before the bump is not cached.
    generation: AtomicU64,
    backend: FlagBackend,
}

impl FlagStore {
    pub fn new(feature: &'static str, default: bool, backend: FlagBackend) -> Self {
        debug!(
            "Flag store '{}' using {} backend (default {})",
            feature,
            backend.kind(),
            default
        );
        Self {
            feature,
            default,
            overlay: DashMap::new(),
            generation: AtomicU64::new(0),
            backend,
        }
    }

    pub fn default_value(&self) -> bool {
        self.default
    }

    /// Current flag for a chat.
    pub async fn get(&self, chat_id: i64) -> bool {
        if let Some(enabled) = self.overlay.get(&chat_id) {
            return *enabled;
        }

        let generation = self.generation.load(Ordering::Acquire);

        match self.backend.load(chat_id).await {
            Ok(stored) => {
                let enabled = stored.unwrap_or(self.default);
                match self.overlay.entry(chat_id) {
                    // A concurrent `set` that landed during the load wins.
                    Entry::Occupied(current) => *current.get(),
                    Entry::Vacant(slot) => {
                        if self.generation.load(Ordering::Acquire) == generation {
                            slot.insert(enabled);
                        }
                        enabled
                    }
                }
            }
            Err(e) => {
                warn!(
                    "Failed to read {} flag for chat {}, assuming {}: {}",
                    self.feature, chat_id, self.default, e
                );
                self.default
            }
        }
    }

    /// Set the flag for a chat. Setting the current value again is a no-op
    /// success that still writes through.
    pub async fn set(&self, chat_id: i64, enabled: bool) {
        self.overlay.insert(chat_id, enabled);

        if let Err(e) = self.backend.save(chat_id, enabled).await {
            warn!(
                "Failed to persist {} flag for chat {} (kept in memory): {}",
                self.feature, chat_id, e
            );
        }
    }

    /// Drop every record. Later reads return the default.
    pub async fn clear(&self) {
        if let Err(e) = self.backend.clear().await {
            warn!("Failed to clear persisted {} flags: {}", self.feature, e);
        }

        // Loads still in flight were read before the records went away.
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.overlay.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_store(path: &std::path::Path, default: bool) -> FlagStore {
        FlagStore::new("reactions", default, FlagBackend::json_file(path))
    }

    #[tokio::test]
    async fn unwritten_chat_gets_default_on_every_backend() {
        let dir = tempfile::tempdir().unwrap();

        for default in [true, false] {
            let memory = FlagStore::new("reactions", default, FlagBackend::Memory);
            let file = json_store(&dir.path().join(format!("{default}.json")), default);

            assert_eq!(memory.get(7).await, default);
            assert_eq!(file.get(7).await, default);
        }
    }

    #[tokio::test]
    async fn set_is_visible_to_next_get() {
        let store = FlagStore::new("reactions", true, FlagBackend::Memory);

        store.set(-100, false).await;
        assert!(!store.get(-100).await);

        store.set(-100, true).await;
        assert!(store.get(-100).await);
    }

    #[tokio::test]
    async fn repeated_set_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = json_store(&dir.path().join("state.json"), true);

        store.set(5, false).await;
        store.set(5, false).await;
        assert!(!store.get(5).await);
    }

    #[tokio::test]
    async fn value_survives_restart_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reaction_state.json");

        let store = json_store(&path, true);
        assert!(store.get(123).await);
        store.set(123, false).await;
        assert!(!store.get(123).await);
        drop(store);

        let restarted = json_store(&path, true);
        assert!(!restarted.get(123).await);
        assert!(restarted.get(456).await);
    }

    #[tokio::test]
    async fn clear_restores_default_for_all_chats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mention_state.json");
        let store = json_store(&path, true);

        store.set(1, false).await;
        store.set(2, false).await;
        store.clear().await;

        assert!(store.get(1).await);
        assert!(store.get(2).await);
        assert!(json_store(&path, true).get(1).await);
    }

    #[tokio::test]
    async fn load_in_flight_during_clear_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mention_state.json");
        std::fs::write(&path, br#"{"1": false}"#).unwrap();
        let store = json_store(&path, true);

        let pending = store.get(1);
        tokio::pin!(pending);
        // Start the file read, then let the reset finish underneath it.
        let early = futures::poll!(&mut pending);

        store.clear().await;
        if early.is_pending() {
            pending.await;
        }

        assert!(!path.exists());
        assert!(store.get(1).await);
    }

    #[tokio::test]
    async fn unreadable_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"[1, 2").unwrap();

        let open = json_store(&path, true);
        assert!(open.get(10).await);

        let closed = json_store(&path, false);
        assert!(!closed.get(10).await);
    }

    #[tokio::test]
    async fn failed_write_is_still_honored_in_process() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every write fail.
        let path = dir.path().join("blocked");
        std::fs::create_dir(&path).unwrap();
        let store = json_store(&path, true);

        store.set(77, false).await;
        assert!(!store.get(77).await);
    }
}
