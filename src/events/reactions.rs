//! Automatic message reactions.
//!
//! A text message gets at most one reaction. A mention of a configured name
//! wins (in any chat, if the chat's mention flag is on); otherwise group
//! messages get the rotating auto reaction when the global switch and the
//! chat's reaction flag are both on.

use teloxide::prelude::*;
use teloxide::types::ReactionType;
use tracing::debug;

use crate::bot::dispatcher::{AppState, ThrottledBot};

/// Why a message is reacted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mention,
    Auto,
}

/// Whether `text` names any of the (lowercased) mention names.
pub fn mentions_any(text: &str, names: &[String]) -> bool {
    if names.is_empty() {
        return false;
    }
    let text = text.to_lowercase();
    names.iter().any(|name| text.contains(name.as_str()))
}

async fn trigger_for(msg: &Message, state: &AppState) -> Option<Trigger> {
    let text = msg.text()?;
    let chat_id = msg.chat.id.0;

    if mentions_any(text, &state.config.mention_usernames) && state.mentions.get(chat_id).await {
        return Some(Trigger::Mention);
    }

    let in_group = msg.chat.is_group() || msg.chat.is_supergroup();
    if in_group && state.config.reaction_bot && state.reactions.get(chat_id).await {
        return Some(Trigger::Auto);
    }

    None
}

/// React to a message if any trigger applies. Telegram refusing the
/// reaction (no rights, reactions disabled in the chat) is not an error.
pub async fn react(bot: &ThrottledBot, msg: &Message, state: &AppState) -> anyhow::Result<()> {
    let Some(trigger) = trigger_for(msg, state).await else {
        return Ok(());
    };

    let emoji = state.picker.next(msg.chat.id.0);

    if let Err(e) = bot
        .set_message_reaction(msg.chat.id, msg.id)
        .reaction(vec![ReactionType::Emoji {
            emoji: emoji.to_string(),
        }])
        .await
    {
        debug!("{:?} reaction {} in chat {} failed: {}", trigger, emoji, msg.chat.id, e);
    }

    Ok(())
}
