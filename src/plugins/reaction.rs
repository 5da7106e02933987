//! Reaction bot toggles.
//!
//! `/reaction` shows the current state with Enable/Disable buttons,
//! `/reactionon` and `/reactionoff` flip it directly. Chat admins, sudo
//! users and bot owners only.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, ReplyParameters};
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::utils::CallbackData;

fn status_label(enabled: bool) -> &'static str {
    if enabled { "ON ✅" } else { "OFF ❌" }
}

fn toggle_keyboard(chat_id: ChatId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            "✅ Enable",
            CallbackData::ReactionToggle {
                chat_id: chat_id.0,
                enable: true,
            }
            .to_string(),
        ),
        InlineKeyboardButton::callback(
            "❌ Disable",
            CallbackData::ReactionToggle {
                chat_id: chat_id.0,
                enable: false,
            }
            .to_string(),
        ),
    ]])
}

/// Group-only, permission-checked preamble shared by the toggle commands.
/// Returns `false` after replying if the caller may not proceed.
pub(super) async fn ensure_can_toggle(bot: &ThrottledBot, msg: &Message, state: &AppState) -> anyhow::Result<bool> {
    let Some(user) = msg.from.as_ref() else {
        bot.send_message(msg.chat.id, "Unknown user.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(false);
    };

    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        bot.send_message(msg.chat.id, "This command only works in groups.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(false);
    }

    if !state.permissions.can_toggle(msg.chat.id, user.id).await {
        bot.send_message(msg.chat.id, "You must be an admin or sudo user to toggle reactions.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(false);
    }

    Ok(true)
}

/// Handle /reaction - show status and toggle buttons.
pub async fn reaction_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !ensure_can_toggle(&bot, &msg, &state).await? {
        return Ok(());
    }

    let enabled = state.reactions.get(msg.chat.id.0).await;
    let text = format!(
        "🎭 <b>Reaction Bot Control</b>\n\nCurrent status: <b>{}</b>",
        status_label(enabled)
    );

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(toggle_keyboard(msg.chat.id))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handle /reactionon.
pub async fn reactionon_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    set_from_command(bot, msg, state, true).await
}

/// Handle /reactionoff.
pub async fn reactionoff_command(
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

    state.reactions.set(msg.chat.id.0, enable).await;
    info!("Reactions {} in chat {}", status_label(enable), msg.chat.id);

    let text = if enable {
        "✅ <b>Reactions enabled</b> in this chat."
    } else {
        "❌ <b>Reactions disabled</b> in this chat."
    };
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handle `reaction_enable:<chat>` / `reaction_disable:<chat>` presses.
///
/// The chat in the payload is re-checked against the presser, so a
/// forwarded keyboard cannot toggle another group.
pub async fn toggle_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
    chat_id: i64,
    enable: bool,
) -> anyhow::Result<()> {
    if !state.permissions.can_toggle(ChatId(chat_id), q.from.id).await {
        bot.answer_callback_query(&q.id)
            .text("Admins only!")
            .show_alert(true)
            .await?;
        return Ok(());
    }

    state.reactions.set(chat_id, enable).await;
    info!("Reactions {} in chat {} by {}", status_label(enable), chat_id, q.from.id);

    if let Some(msg) = &q.message {
        let text = if enable {
            "✅ Reactions have been <b>enabled</b> in this chat."
        } else {
            "❌ Reactions have been <b>disabled</b> in this chat."
        };
        let _ = bot
            .edit_message_text(msg.chat().id, msg.id(), text)
            .parse_mode(ParseMode::Html)
            .await;
    }

    bot.answer_callback_query(&q.id).await?;
    Ok(())
}
