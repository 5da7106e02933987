//! Per-chat feature flag document.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One document per chat and feature collection.
///
/// The `enabled` field is authoritative. A missing document means the
/// store's configured default applies. Older documents carry only
/// `chat_id`, written to switch a chat off, so a missing `enabled` reads
/// as `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagRecord {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Telegram chat ID (indexed)
    pub chat_id: i64,

    #[serde(default)]
    pub enabled: bool,

    /// Unix timestamp of the last toggle.
    #[serde(default)]
    pub updated_at: i64,
}

impl FlagRecord {
    pub fn new(chat_id: i64, enabled: bool) -> Self {
        Self {
            id: None,
            chat_id,
            enabled,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document, to_document};

    #[test]
    fn new_record_stores_value_and_timestamp_without_id() {
        let document = to_document(&FlagRecord::new(-1001, false)).unwrap();

        assert!(!document.contains_key("_id"));
        assert_eq!(document.get_i64("chat_id").unwrap(), -1001);
        assert!(!document.get_bool("enabled").unwrap());
        assert!(document.get_i64("updated_at").unwrap() > 0);
    }

    #[test]
    fn chat_id_only_document_reads_as_disabled() {
        let record: FlagRecord = from_document(doc! { "chat_id": -1001_i64 }).unwrap();

        assert_eq!(record.chat_id, -1001);
        assert!(!record.enabled);
        assert_eq!(record.updated_at, 0);
    }

    #[test]
    fn stored_value_is_kept() {
        let record: FlagRecord =
            from_document(doc! { "chat_id": 7_i64, "enabled": true, "updated_at": 1_700_000_000_i64 })
                .unwrap();

        assert!(record.enabled);
        assert_eq!(record.updated_at, 1_700_000_000);
    }
}
