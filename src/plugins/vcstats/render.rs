//! Dashboard captions and keyboards.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::stats::ActiveCalls;
use super::refresher::REFRESH_INTERVAL;
use crate::utils::{CallKind, CallbackData, Page};

/// Which screen the summary is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    Initial,
    Refreshed,
    Auto,
}

fn light(count: usize) -> &'static str {
    if count > 0 { "🍏" } else { "🍎" }
}

fn button(text: &str, data: CallbackData) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, data.to_string())
}

pub fn summary_caption(calls: &ActiveCalls, mode: SummaryMode) -> String {
    let title = match mode {
        SummaryMode::Initial => "💥 <b>Live VC Stats</b>",
        SummaryMode::Refreshed => "💥 <b>Live VC Stats (Refreshed)</b>",
        SummaryMode::Auto => "💥 <b>Live VC Stats (Auto)</b>",
    };

    let mut caption = format!(
        "<blockquote>{title}</blockquote>\n\
         <blockquote>{} <b>Audio Chat:</b> <code>{}</code>\n\
         {} <b>Video Chat:</b> <code>{}</code>\n\
         🕒 <b>Updated:</b> <code>{}</code></blockquote>",
        light(calls.audio.len()),
        calls.audio.len(),
        light(calls.video.len()),
        calls.video.len(),
        calls.fetched_at.format("%H:%M:%S UTC"),
    );

    if mode == SummaryMode::Auto {
        caption.push_str(&format!(
            "\n<blockquote>⏳ <b>Refresh every {} sec</b></blockquote>",
            REFRESH_INTERVAL.as_secs()
        ));
    }

    caption
}

fn page_buttons() -> Vec<InlineKeyboardButton> {
    vec![
        button(
            "Audio Chat",
            CallbackData::VcPage {
                kind: CallKind::Audio,
                page: 1,
            },
        ),
        button(
            "Video Chat",
            CallbackData::VcPage {
                kind: CallKind::Video,
                page: 1,
            },
        ),
    ]
}

/// Keyboard under the summary. While auto-refresh runs the refresh buttons
/// are replaced by a stop button.
pub fn summary_keyboard(auto: bool) -> InlineKeyboardMarkup {
    let mut rows = vec![page_buttons()];

    if auto {
        rows.push(vec![button("🔻 Stop Auto 🔻", CallbackData::VcStopAutoRefresh)]);
    } else {
        rows.push(vec![
            button("🔁 Refresh", CallbackData::VcRefresh),
            button("⏳ Auto Refresh", CallbackData::VcAutoRefresh),
        ]);
        rows.push(vec![button("🔻 Close 🔻", CallbackData::VcClose)]);
    }

    InlineKeyboardMarkup::new(rows)
}

pub fn page_text(kind: CallKind, page: &Page<'_, i64>) -> String {
    let mut text = match kind {
        CallKind::Audio => "🎧 <b>Active Audio Chats</b>".to_string(),
        CallKind::Video => "🎥 <b>Active Video Chats</b>".to_string(),
    };
    text.push_str(&format!(" ({}/{})\n\n", page.number, page.total_pages));

    if page.items.is_empty() {
        let empty = match kind {
            CallKind::Audio => "<code>No active audio chats.</code>",
            CallKind::Video => "<code>No active video chats.</code>",
        };
        text.push_str(empty);
    } else {
        for chat_id in page.items {
            text.push_str(&format!("• <code>{chat_id}</code>\n"));
        }
    }

    text
}

pub fn page_keyboard(kind: CallKind, page: &Page<'_, i64>) -> InlineKeyboardMarkup {
    let mut nav = Vec::new();
    if page.has_prev() {
        nav.push(button(
            "⤌ Prev",
            CallbackData::VcPage {
                kind,
                page: page.number - 1,
            },
        ));
    }
    if page.has_next() {
        nav.push(button(
            "Next ⤍",
            CallbackData::VcPage {
                kind,
                page: page.number + 1,
            },
        ));
    }

    let mut rows = Vec::new();
    if !nav.is_empty() {
        rows.push(nav);
    }
    rows.push(vec![button("🔻 Back 🔻", CallbackData::VcRefresh)]);

    InlineKeyboardMarkup::new(rows)
}
