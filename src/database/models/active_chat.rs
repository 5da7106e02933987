//! Active call document written by the music player.

use serde::{Deserialize, Serialize};

/// A chat that currently has a voice or video call in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveChat {
    pub chat_id: i64,
}
