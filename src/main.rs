//! Chatpulse - Telegram chat activity plugins
//!
//! Live voice/video chat stats for sudo users and per-chat emoji reactions.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration
//! - `cache` - Moka caches and the short-lived stats memo
//! - `flags` - Persistent per-chat on/off switches
//! - `permissions` - Owner/sudo/admin checks with caching
//! - `bot` - Core bot functionality (with Throttle for API rate limiting)
//! - `plugins` - Command and callback handlers
//! - `events` - Message reactions
//! - `utils` - Pagination, callback payloads, emoji rotation

mod bot;
mod cache;
mod config;
mod database;
mod events;
mod flags;
mod permissions;
mod plugins;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use database::Database;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chatpulse=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Chatpulse bot...");

    let config = Arc::new(Config::from_env()?);
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}, reaction store: {:?}", config.bot_mode, config.reaction_store);

    // Active call lists always come from MongoDB, whatever the flag store.
    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;

    // Throttle respects Telegram's global, per-chat and per-group limits.
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if config.owner_ids.is_empty() {
        info!("No owner IDs configured (OWNER_IDS is empty)");
    } else {
        info!("Bot owners: {:?}", config.owner_ids);
    }

    // Cancelled once dispatching returns so refresh loops end with the bot.
    let shutdown = CancellationToken::new();

    let state = bot::AppState::new(&bot, &db, Arc::clone(&config), shutdown.clone());
    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    let result = bot::run(&config, dispatcher, bot).await;
    shutdown.cancel();
    info!("Chatpulse stopped");

    result
}
