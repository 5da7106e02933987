//! Plugin system for command and callback handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding the handler to `command_handler()` or `route_callback()`

pub mod mention;
pub mod reaction;
pub mod vcstats;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::debug;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::utils::{CallbackData, CallbackParseError};

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Reaction bot status and toggle buttons")]
    Reaction,

    #[command(description = "Enable auto reactions in this chat")]
    Reactionon,

    #[command(description = "Disable auto reactions in this chat")]
    Reactionoff,

    #[command(description = "Enable mention reactions in this chat")]
    Mentionon,

    #[command(description = "Disable mention reactions in this chat")]
    Mentionoff,

    #[command(description = "Reset mention reactions in every chat (owner)")]
    Mentionreset,

    #[command(description = "Live voice/video chat stats (sudo)")]
    Vcstats,

    #[command(description = "Alias of /vcstats")]
    Vcs,

    #[command(description = "Alias of /vcstats")]
    Vct,
}

/// Prefixes besides `/` that the stats command answers to.
const STATS_PREFIXES: [char; 6] = ['!', '%', ',', '.', '@', '#'];

/// Whether `text` is the stats command written with one of the other
/// prefixes, e.g. `!vcs` or `.vcstats@SomeBot`.
pub fn is_prefixed_stats_command(text: &str) -> bool {
    let Some(word) = text.split_whitespace().next() else {
        return false;
    };
    let Some(rest) = word.strip_prefix(STATS_PREFIXES) else {
        return false;
    };
    let name = rest.split('@').next().unwrap_or_default().to_lowercase();
    matches!(name.as_str(), "vcstats" | "vcs" | "vct")
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(slash_commands())
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(is_prefixed_stats_command))
                .endpoint(vcstats::vcstats_command),
        )
}

fn slash_commands() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        // Reactions
        .branch(case![Command::Reaction].endpoint(reaction::reaction_command))
        .branch(case![Command::Reactionon].endpoint(reaction::reactionon_command))
        .branch(case![Command::Reactionoff].endpoint(reaction::reactionoff_command))
        // Mentions
        .branch(case![Command::Mentionon].endpoint(mention::mentionon_command))
        .branch(case![Command::Mentionoff].endpoint(mention::mentionoff_command))
        .branch(case![Command::Mentionreset].endpoint(mention::mentionreset_command))
        // Stats
        .branch(case![Command::Vcstats].endpoint(vcstats::vcstats_command))
        .branch(case![Command::Vcs].endpoint(vcstats::vcstats_command))
        .branch(case![Command::Vct].endpoint(vcstats::vcstats_command))
}

/// Build the callback query handler. Expects a `CallbackQuery` in scope.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    dptree::endpoint(route_callback)
}

/// Decode the payload and hand the press to its plugin.
async fn route_callback(bot: ThrottledBot, q: CallbackQuery, state: AppState) -> anyhow::Result<()> {
    let parsed = q
        .data
        .as_deref()
        .ok_or_else(|| CallbackParseError::Unknown(String::new()))
        .and_then(str::parse::<CallbackData>);

    let data = match parsed {
        Ok(data) => data,
        Err(e) => {
            debug!("Rejecting callback from {}: {}", q.from.id, e);
            bot.answer_callback_query(&q.id)
                .text("❌ Invalid button data.")
                .await?;
            return Ok(());
        }
    };

    match data {
        CallbackData::ReactionToggle { chat_id, enable } => {
            reaction::toggle_callback(bot, q, state, chat_id, enable).await
        }
        CallbackData::VcPage { kind, page } => {
            vcstats::page_callback(bot, q, state, kind, page).await
        }
        CallbackData::VcRefresh => vcstats::refresh_callback(bot, q, state).await,
        CallbackData::VcAutoRefresh => vcstats::autorefresh_callback(bot, q, state).await,
        CallbackData::VcStopAutoRefresh => vcstats::stop_autorefresh_callback(bot, q, state).await,
        CallbackData::VcClose => vcstats::close_callback(bot, q, state).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_command_accepts_other_prefixes() {
        assert!(is_prefixed_stats_command("!vcstats"));
        assert!(is_prefixed_stats_command(".VCS now"));
        assert!(is_prefixed_stats_command("#vct@ChatPulseBot"));
        assert!(is_prefixed_stats_command("@vcs"));
    }

    #[test]
    fn other_words_and_prefixes_are_ignored() {
        assert!(!is_prefixed_stats_command("vcstats"));
        assert!(!is_prefixed_stats_command("/vcstats"));
        assert!(!is_prefixed_stats_command("!vcstatsx"));
        assert!(!is_prefixed_stats_command("!reaction"));
        assert!(!is_prefixed_stats_command(""));
    }
}
