//! Live voice/video chat stats dashboard.
//!
//! `/vcstats` (aliases `/vcs`, `/vct`) posts a summary of chats with an
//! active call. Buttons page through either list, refresh the summary, or
//! start an auto-refresh loop that re-renders every 10 seconds for about
//! five minutes. Sudo users only.

mod refresher;
mod render;
mod stats;

pub use refresher::AutoRefresher;
pub use stats::CallStats;

use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode, ReplyParameters};
use tracing::{debug, error, info};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::utils::{paginate, safe_edit, CallKind, EditTarget, PAGE_SIZE};
use render::SummaryMode;

/// Handle /vcstats - post the dashboard.
pub async fn vcstats_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id,
        None => return Ok(()),
    };

    if !state.permissions.is_sudo(user_id) {
        bot.send_message(msg.chat.id, "❌ Only sudo users can use this command.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let calls = match state.stats.read().await {
        Ok(calls) => calls,
        Err(e) => {
            error!("Failed to load active calls: {:#}", e);
            bot.send_message(msg.chat.id, "⚠️ Could not load call stats right now.")
                .reply_parameters(ReplyParameters::new(msg.id))
                .await?;
            return Ok(());
        }
    };

    let caption = render::summary_caption(&calls, SummaryMode::Initial);
    let keyboard = render::summary_keyboard(false);

    match &state.config.start_img_url {
        Some(url) => {
            bot.send_photo(msg.chat.id, InputFile::url(url.clone()))
                .caption(caption)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .reply_parameters(ReplyParameters::new(msg.id))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, caption)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .reply_parameters(ReplyParameters::new(msg.id))
                .await?;
        }
    }

    info!("Posted VC stats in chat {} for user {}", msg.chat.id, user_id);
    Ok(())
}

/// Where a dashboard callback came from.
fn edit_target(q: &CallbackQuery, state: &AppState) -> Option<EditTarget> {
    q.message.as_ref().map(|m| EditTarget {
        chat_id: m.chat().id,
        message_id: m.id(),
        has_media: state.config.start_img_url.is_some(),
    })
}

async fn deny(bot: &ThrottledBot, q: &CallbackQuery) -> anyhow::Result<()> {
    bot.answer_callback_query(&q.id)
        .text("❌ Unauthorized")
        .show_alert(true)
        .await?;
    Ok(())
}

/// `vc_refresh_manual` - re-render the summary in place.
pub async fn refresh_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    if !state.permissions.is_sudo(q.from.id) {
        return deny(&bot, &q).await;
    }
    let Some(target) = edit_target(&q, &state) else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };

    // Pressing refresh while the loop runs hands control back to the user.
    state.refresher.stop((target.chat_id.0, target.message_id.0));

    match state.stats.read().await {
        Ok(calls) => {
            let caption = render::summary_caption(&calls, SummaryMode::Refreshed);
            if let Err(e) = safe_edit(&bot, target, caption, render::summary_keyboard(false)).await {
                error!("Failed to refresh VC stats message: {}", e);
            }
            bot.answer_callback_query(&q.id).text("🔁 Updated").await?;
        }
        Err(e) => {
            error!("Failed to load active calls: {:#}", e);
            bot.answer_callback_query(&q.id)
                .text("⚠️ Stats unavailable, try again.")
                .await?;
        }
    }

    Ok(())
}

/// `vc_enable_autorefresh` - start the bounded refresh loop for this message.
pub async fn autorefresh_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    if !state.permissions.is_sudo(q.from.id) {
        return deny(&bot, &q).await;
    }
    let Some(target) = edit_target(&q, &state) else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };

    bot.answer_callback_query(&q.id)
        .text("⏳ Auto-refresh started")
        .await?;

    let key = (target.chat_id.0, target.message_id.0);
    if state.refresher.is_running(key) {
        info!("Restarting auto-refresh for message {:?}", key);
    }

    let stats = state.stats.clone();
    let loop_bot = bot.clone();
    state
        .refresher
        .start(key, move |n| {
            let stats = stats.clone();
            let bot = loop_bot.clone();
            async move {
                let calls = stats.read().await?;
                let caption = render::summary_caption(&calls, SummaryMode::Auto);
                safe_edit(&bot, target, caption, render::summary_keyboard(true)).await?;
                debug!("Auto-refresh render {} for message {}", n + 1, target.message_id);
                Ok(())
            }
        });

    Ok(())
}

/// `vc_stop_autorefresh` - cancel the loop for this message.
pub async fn stop_autorefresh_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    if !state.permissions.is_sudo(q.from.id) {
        return deny(&bot, &q).await;
    }

    if let Some(target) = edit_target(&q, &state) {
        let key = (target.chat_id.0, target.message_id.0);
        if state.refresher.stop(key) {
            info!("Auto-refresh stopped for message {:?}", key);
        }

        if let Ok(calls) = state.stats.read().await {
            let caption = render::summary_caption(&calls, SummaryMode::Refreshed);
            if let Err(e) = safe_edit(&bot, target, caption, render::summary_keyboard(false)).await {
                debug!("Could not restore dashboard after stop: {}", e);
            }
        }
    }

    bot.answer_callback_query(&q.id)
        .text("🛑 Stopped")
        .show_alert(true)
        .await?;
    Ok(())
}

/// `vc_audio_page_<n>` / `vc_video_page_<n>` - show one page of a list.
pub async fn page_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
    kind: CallKind,
    page: usize,
) -> anyhow::Result<()> {
    if !state.permissions.is_sudo(q.from.id) {
        return deny(&bot, &q).await;
    }
    let Some(target) = edit_target(&q, &state) else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };

    let calls = match state.stats.read().await {
        Ok(calls) => calls,
        Err(e) => {
            error!("Failed to load active calls: {:#}", e);
            bot.answer_callback_query(&q.id)
                .text("⚠️ Stats unavailable, try again.")
                .await?;
            return Ok(());
        }
    };

    let page = match paginate(calls.list(kind), page, PAGE_SIZE) {
        Ok(page) => page,
        Err(e) => {
            bot.answer_callback_query(&q.id)
                .text(format!("❌ {e}"))
                .show_alert(true)
                .await?;
            return Ok(());
        }
    };

    // Paging away from an auto-refreshing summary ends the loop.
    state.refresher.stop((target.chat_id.0, target.message_id.0));

    let text = render::page_text(kind, &page);
    let keyboard = render::page_keyboard(kind, &page);
    if let Err(e) = safe_edit(&bot, target, text, keyboard).await {
        error!("Failed to show {:?} page {}: {}", kind, page.number, e);
    }

    bot.answer_callback_query(&q.id).await?;
    Ok(())
}

/// `vc_close` - delete the dashboard.
pub async fn close_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    if let Some(message) = &q.message {
        let chat_id = message.chat().id;
        let message_id: MessageId = message.id();
        state.refresher.stop((chat_id.0, message_id.0));

        if let Err(e) = bot.delete_message(chat_id, message_id).await {
            debug!("Dashboard already gone: {}", e);
        }
    }

    bot.answer_callback_query(&q.id).text("❌ Closed").await?;
    Ok(())
}
