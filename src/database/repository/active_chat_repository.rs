//! Active call lists.
//!
//! The music player keeps one document per chat with a running call in
//! `activechats` (audio) and `activevideochats` (video). This repository
//! only reads them.

use std::future::Future;

use anyhow::Result;
use futures::StreamExt;
use mongodb::bson::doc;
use mongodb::Collection;
use tracing::{debug, warn};

use crate::database::models::ActiveChat;
use crate::database::Database;

/// Source of the chats that currently have a call running.
pub trait ActiveChatSource: Send + Sync + 'static {
    /// Chats with an audio call, in the order the player registered them.
    fn audio_chats(&self) -> impl Future<Output = Result<Vec<i64>>> + Send;

    /// Chats with a video call, in the order the player registered them.
    fn video_chats(&self) -> impl Future<Output = Result<Vec<i64>>> + Send;
}

/// MongoDB-backed active chat lists.
#[derive(Clone)]
pub struct ActiveChatRepository {
    audio: Collection<ActiveChat>,
    video: Collection<ActiveChat>,
}

impl ActiveChatRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            audio: db.collection("activechats"),
            video: db.collection("activevideochats"),
        }
    }

    async fn list(collection: &Collection<ActiveChat>) -> Result<Vec<i64>> {
        let mut cursor = collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        let mut chats = Vec::new();

        while let Some(result) = cursor.next().await {
            match result {
                Ok(active) => chats.push(active.chat_id),
                Err(e) => warn!("Skipping unreadable active chat document: {}", e),
            }
        }

        debug!("Loaded {} active chats from {}", chats.len(), collection.name());
        Ok(chats)
    }
}

impl ActiveChatSource for ActiveChatRepository {
    async fn audio_chats(&self) -> Result<Vec<i64>> {
        Self::list(&self.audio).await
    }

    async fn video_chats(&self) -> Result<Vec<i64>> {
        Self::list(&self.video).await
    }
}
