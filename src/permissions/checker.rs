//! Permission checker with caching.

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMember, ChatMemberKind, UserId};
use tracing::{debug, warn};

use crate::cache::{CacheConfig, TypedCache};

/// Cache key for admin lookups.
type AdminCacheKey = (i64, u64); // (chat_id, user_id)

/// Permission checker with caching support.
#[derive(Clone)]
pub struct Permissions {
    bot: Bot,
    cache: TypedCache<AdminCacheKey, bool>,
    owner_ids: Vec<u64>,
    sudo_ids: Vec<u64>,
}

impl Permissions {
    pub fn new(bot: Bot, owner_ids: Vec<u64>, sudo_ids: Vec<u64>) -> Self {
        Self {
            bot,
            cache: TypedCache::new("chat_admins", CacheConfig::admin_lookup()),
            owner_ids,
            sudo_ids,
        }
    }

    #[inline]
    pub fn is_bot_owner(&self, user_id: UserId) -> bool {
        self.owner_ids.contains(&user_id.0)
    }

    /// Bot owners count as sudo.
    #[inline]
    pub fn is_sudo(&self, user_id: UserId) -> bool {
        self.is_bot_owner(user_id) || self.sudo_ids.contains(&user_id.0)
    }

    /// Check if a user is creator or administrator of the chat.
    pub async fn is_chat_admin(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        let cache_key = (chat_id.0, user_id.0);

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Admin cache hit for user {} in chat {}", user_id, chat_id);
            return Ok(cached);
        }

        debug!("Admin cache miss for user {} in chat {}", user_id, chat_id);

        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        let is_admin = is_privileged(&member);

        // Cache the result (including false for non-admins)
        self.cache.insert(cache_key, is_admin);

        Ok(is_admin)
    }

    /// Whether a user may flip a chat's reaction switches.
    ///
    /// Owners and sudo users always may; others must be chat admins. A failed
    /// lookup denies.
    pub async fn can_toggle(&self, chat_id: ChatId, user_id: UserId) -> bool {
        if self.is_sudo(user_id) {
            return true;
        }

        match self.is_chat_admin(chat_id, user_id).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!("Admin lookup for user {} in chat {} failed: {}", user_id, chat_id, e);
                false
            }
        }
    }
}

fn is_privileged(member: &ChatMember) -> bool {
    matches!(
        member.kind,
        ChatMemberKind::Owner(_) | ChatMemberKind::Administrator(_)
    )
}
