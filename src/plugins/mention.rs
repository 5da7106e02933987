//! Mention reaction toggles.
//!
//! When a message names one of `MENTION_USERNAMES`, the bot reacts to it.
//! `/mentionon` and `/mentionoff` switch that per chat; `/mentionreset`
//! (bot owners) forgets every chat's setting.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::info;

use super::reaction::ensure_can_toggle;
use crate::bot::dispatcher::{AppState, ThrottledBot};

/// Handle /mentionon.
pub async fn mentionon_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    set_from_command(bot, msg, state, true).await
}

/// Handle /mentionoff.
pub async fn mentionoff_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    set_from_command(bot, msg, state, false).await
}

async fn set_from_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    enable: bool,
) -> anyhow::Result<()> {
    if !ensure_can_toggle(&bot, &msg, &state).await? {
        return Ok(());
    }

    state.mentions.set(msg.chat.id.0, enable).await;
    info!("Mention reactions set to {} in chat {}", enable, msg.chat.id);

    let text = if enable {
        "✅ <b>Mention reactions enabled</b> in this chat."
    } else {
        "❌ <b>Mention reactions disabled</b> in this chat."
    };
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handle /mentionreset - clear the mention store for all chats.
pub async fn mentionreset_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    if !state.permissions.is_bot_owner(user.id) {
        bot.send_message(msg.chat.id, "❌ Only the bot owner can reset mention settings.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    state.mentions.clear().await;
    info!("Mention reaction settings cleared by {}", user.id);

    let default = if state.mentions.default_value() { "ON" } else { "OFF" };
    bot.send_message(
        msg.chat.id,
        format!("♻️ Mention reaction settings reset. Every chat is back to <b>{default}</b>."),
    )
    .parse_mode(ParseMode::Html)
    .reply_parameters(ReplyParameters::new(msg.id))
    .await?;

    Ok(())
}
