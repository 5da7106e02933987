//! Cache module.
//!
//! Two kinds of caches live here:
//! - `TypedCache` - a keyed Moka cache with TTL/TTI, used for lookups that hit
//!   the Telegram API (chat admin status).
//! - `TtlMemo` - a single-slot memo that holds one value for a fixed duration,
//!   used for the live call stats.
//!
//! ## Usage
//!
//! ```rust
//! let admins: TypedCache<(i64, u64), bool> =
//!     TypedCache::new("admins", CacheConfig::admin_lookup());
//! admins.insert((chat_id, user_id), true);
//!
//! let memo = TtlMemo::new(Duration::from_secs(5));
//! let chats = memo.get_or_refresh(|| source.audio_chats()).await?;
//! ```

mod config;
mod memo;
mod typed;

pub use config::CacheConfig;
pub use memo::TtlMemo;
pub use typed::TypedCache;
