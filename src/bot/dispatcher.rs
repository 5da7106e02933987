//! Message dispatcher setup.
//!
//! Builds the dispatcher with all command handlers and event handlers.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{Config, StoreKind};
use crate::database::{ActiveChatRepository, Database, FlagRepository};
use crate::events;
use crate::flags::{FlagBackend, FlagStore};
use crate::permissions::Permissions;
use crate::plugins::{self, vcstats::AutoRefresher, vcstats::CallStats};
use crate::utils::EmojiPicker;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
///
/// Every cache and store lives here for the life of the process; handlers
/// get a cheap clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Owner/sudo/admin checks with cached admin lookups.
    pub permissions: Permissions,

    /// Per-chat auto reaction switch (default on).
    pub reactions: Arc<FlagStore>,

    /// Per-chat mention reaction switch (default on).
    pub mentions: Arc<FlagStore>,

    /// Emoji rotation shared by both reaction triggers.
    pub picker: Arc<EmojiPicker>,

    /// Active call lists behind a 5 second memo.
    pub stats: Arc<CallStats<ActiveChatRepository>>,

    /// Running dashboard auto-refresh loops.
    pub refresher: AutoRefresher,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        bot: &ThrottledBot,
        db: &Database,
        config: Arc<Config>,
        shutdown: CancellationToken,
    ) -> Self {
        // Note: Permissions needs the inner Bot for API calls
        let permissions = Permissions::new(
            bot.inner().clone(),
            config.owner_ids.clone(),
            config.sudo_ids.clone(),
        );

        let (reaction_backend, mention_backend) = match config.reaction_store {
            StoreKind::Mongo => (
                FlagBackend::Mongo(FlagRepository::new(db, "reactionstatus")),
                FlagBackend::Mongo(FlagRepository::new(db, "mentionstatus")),
            ),
            StoreKind::Json => (
                FlagBackend::json_file(&config.reaction_state_path),
                FlagBackend::json_file(&config.mention_state_path),
            ),
            StoreKind::Memory => (FlagBackend::Memory, FlagBackend::Memory),
        };

        let picker = EmojiPicker::new(config.start_reactions.as_slice());
        info!("Reaction candidates: {}", picker.candidates().join(" "));

        Self {
            permissions,
            reactions: Arc::new(FlagStore::new("reactions", true, reaction_backend)),
            mentions: Arc::new(FlagStore::new("mentions", true, mention_backend)),
            picker: Arc::new(picker),
            stats: Arc::new(CallStats::new(ActiveChatRepository::new(db))),
            refresher: AutoRefresher::new(shutdown),
            config,
        }
    }

    /// Whether updates from this user are dropped.
    pub fn is_banned(&self, user: Option<&teloxide::types::User>) -> bool {
        user.is_some_and(|u| self.config.is_banned(u.id.0))
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    // Message handlers: commands first, then reaction events
    let message_handler = Update::filter_message()
        .filter(|msg: Message, state: AppState| !state.is_banned(msg.from.as_ref()))
        .branch(plugins::command_handler())
        .branch(events::message_event_handler());

    // Callback query handler
    let callback_handler = Update::filter_callback_query()
        .filter(|q: CallbackQuery, state: AppState| !state.is_banned(Some(&q.from)))
        .branch(plugins::callback_handler());

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}
