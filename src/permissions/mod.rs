//! Permission system for checking user roles.
//!
//! Three roles matter to the plugins:
//!
//! - bot owner (`OWNER_IDS`) - everything, everywhere
//! - sudo user (`SUDO_USERS`) - stats dashboard, any chat's toggles
//! - chat admin (creator or administrator) - toggles in their own chat
//!
//! Chat admin lookups go to the Telegram API and are cached.
//!
//! ## Usage
//!
//! ```rust
//! if !state.permissions.can_toggle(msg.chat.id, user.id).await {
//!     // reject
//! }
//! ```

mod checker;

pub use checker::Permissions;
