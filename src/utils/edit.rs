//! Message edit helper that tolerates unchanged content.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use tracing::debug;

use crate::bot::dispatcher::ThrottledBot;

/// A bot message that gets re-rendered in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditTarget {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Photo messages are edited through their caption.
    pub has_media: bool,
}

/// Replace the text (or caption) and keyboard of a message.
///
/// Telegram rejects an edit that changes nothing; in that case only the
/// keyboard is re-sent and its own failure is ignored. Any other error is
/// returned so loops can stop on a deleted message.
pub async fn safe_edit(
    bot: &ThrottledBot,
    target: EditTarget,
    text: String,
    keyboard: InlineKeyboardMarkup,
) -> Result<(), RequestError> {
    let result = if target.has_media {
        bot.edit_message_caption(target.chat_id, target.message_id)
            .caption(text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard.clone())
            .await
            .map(|_| ())
    } else {
        bot.edit_message_text(target.chat_id, target.message_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard.clone())
            .await
            .map(|_| ())
    };

    match result {
        Err(RequestError::Api(ApiError::MessageNotModified)) => {
            debug!("Message {} unchanged, refreshing keyboard only", target.message_id);
            if let Err(e) = bot
                .edit_message_reply_markup(target.chat_id, target.message_id)
                .reply_markup(keyboard)
                .await
            {
                debug!("Keyboard refresh skipped: {}", e);
            }
            Ok(())
        }
        other => other,
    }
}
