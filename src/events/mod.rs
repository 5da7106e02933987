//! Event handler system.
//!
//! Add new event handlers by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_event;` below
//! 3. Calling it from `unified_message_handler()`

pub mod reactions;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{debug, error};

use crate::bot::dispatcher::{AppState, ThrottledBot};

/// Build the message event handler for plain (non-command) text messages.
pub fn message_event_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| msg.text().is_some_and(|t| !t.starts_with('/')))
        .endpoint(unified_message_handler)
}

/// Unified message handler that runs all sub-handlers.
async fn unified_message_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    debug!(
        "unified_message_handler: chat={}, text='{}'",
        msg.chat.id,
        msg.text().unwrap_or("").chars().take(30).collect::<String>()
    );

    if let Err(e) = reactions::react(&bot, &msg, &state).await {
        error!("Reaction handler error: {}", e);
    }

    Ok(())
}
