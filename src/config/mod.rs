//! Configuration module for the chatpulse bot.
//!
//! Loads configuration from environment variables (and `.env`).

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Bot running mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Durable backend for the per-chat flag stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreKind {
    #[default]
    Mongo,
    Json,
    Memory,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<Url>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Bot owners: every permission everywhere, plus `/mentionreset`.
    pub owner_ids: Vec<u64>,

    /// Sudo users: may open the stats dashboard and toggle any chat.
    pub sudo_ids: Vec<u64>,

    /// Users whose updates are ignored entirely.
    pub banned_ids: Vec<u64>,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    // Flag stores
    pub reaction_store: StoreKind,
    pub reaction_state_path: PathBuf,
    pub mention_state_path: PathBuf,

    // Reactions
    /// Global switch; when off no chat gets auto reactions.
    pub reaction_bot: bool,
    /// Preferred reaction emojis, filtered against Telegram's allow-list.
    pub start_reactions: Vec<String>,
    /// Lowercased names that trigger a mention reaction.
    pub mention_usernames: Vec<String>,

    /// Photo shown on the stats dashboard. Text-only when unset.
    pub start_img_url: Option<Url>,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_mode = match var("BOT_MODE").map(|m| m.to_lowercase()).as_deref() {
            None | Some("polling") => BotMode::Polling,
            Some("webhook") => BotMode::Webhook,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "BOT_MODE",
                    value: other.to_string(),
                    reason: "expected polling or webhook",
                });
            }
        };

        let webhook_url = var("WEBHOOK_URL")
            .map(|raw| parse_url("WEBHOOK_URL", raw))
            .transpose()?;

        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::Missing("WEBHOOK_URL"));
        }

        let webhook_port = match var("WEBHOOK_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "WEBHOOK_PORT",
                value: raw,
                reason: "expected a port number",
            })?,
            None => 8443,
        };

        let reaction_store = match var("REACTION_STORE").map(|s| s.to_lowercase()).as_deref() {
            None | Some("mongo") => StoreKind::Mongo,
            Some("json") => StoreKind::Json,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "REACTION_STORE",
                    value: other.to_string(),
                    reason: "expected mongo, json or memory",
                });
            }
        };

        let reaction_bot = match var("REACTION_BOT") {
            Some(raw) => parse_bool("REACTION_BOT", raw)?,
            None => true,
        };

        Ok(Self {
            bot_token: var("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?,
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: var("WEBHOOK_SECRET"),
            owner_ids: parse_ids(var("OWNER_IDS")),
            sudo_ids: parse_ids(var("SUDO_USERS")),
            banned_ids: parse_ids(var("BANNED_USERS")),
            mongodb_uri: var("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
            mongodb_database: var("MONGODB_DATABASE").unwrap_or_else(|| "chatpulse".to_string()),
            reaction_store,
            reaction_state_path: var("REACTION_STATE_PATH")
                .unwrap_or_else(|| "reaction_state.json".to_string())
                .into(),
            mention_state_path: var("MENTION_STATE_PATH")
                .unwrap_or_else(|| "mention_state.json".to_string())
                .into(),
            reaction_bot,
            start_reactions: parse_list(var("START_REACTIONS")),
            mention_usernames: parse_list(var("MENTION_USERNAMES"))
                .into_iter()
                .map(|name| name.trim_start_matches('@').to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
            start_img_url: var("START_IMG_URL")
                .map(|raw| parse_url("START_IMG_URL", raw))
                .transpose()?,
        })
    }

    pub fn is_banned(&self, user_id: u64) -> bool {
        self.banned_ids.contains(&user_id)
    }
}

/// Comma-separated numeric IDs; unparseable entries are skipped.
fn parse_ids(raw: Option<String>) -> Vec<u64> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect()
}

/// Comma- or whitespace-separated list.
fn parse_list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected true or false",
        }),
    }
}

fn parse_url(key: &'static str, raw: String) -> Result<Url, ConfigError> {
    Url::parse(&raw).map_err(|_| ConfigError::Invalid {
        key,
        value: raw,
        reason: "expected an absolute URL",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("BOT_TOKEN", "123:abc"), ("MONGODB_URI", "mongodb://localhost")];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.bot_mode, BotMode::Polling);
        assert_eq!(config.reaction_store, StoreKind::Mongo);
        assert_eq!(config.mongodb_database, "chatpulse");
        assert_eq!(config.reaction_state_path, PathBuf::from("reaction_state.json"));
        assert_eq!(config.webhook_port, 8443);
        assert!(config.reaction_bot);
        assert!(config.start_img_url.is_none());
        assert!(config.owner_ids.is_empty());
    }

    #[test]
    fn missing_token_is_reported() {
        let err = load(&[("MONGODB_URI", "mongodb://localhost")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("BOT_TOKEN"));
    }

    #[test]
    fn webhook_mode_requires_url() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("BOT_MODE", "webhook"));
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("WEBHOOK_URL"));

        vars.push(("WEBHOOK_URL", "https://bot.example.com/hook"));
        let config = load(&vars).unwrap();
        assert_eq!(config.bot_mode, BotMode::Webhook);
        assert_eq!(config.webhook_url.unwrap().host_str(), Some("bot.example.com"));
    }

    #[test]
    fn lists_and_ids_are_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("OWNER_IDS", "1, 2,x"),
            ("SUDO_USERS", "3"),
            ("BANNED_USERS", "9"),
            ("START_REACTIONS", "👍,🔥 🎉"),
            ("MENTION_USERNAMES", "@Alice, BOB"),
            ("REACTION_STORE", "JSON"),
            ("REACTION_BOT", "off"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.owner_ids, vec![1, 2]);
        assert_eq!(config.sudo_ids, vec![3]);
        assert!(config.is_banned(9));
        assert_eq!(config.start_reactions, vec!["👍", "🔥", "🎉"]);
        assert_eq!(config.mention_usernames, vec!["alice", "bob"]);
        assert_eq!(config.reaction_store, StoreKind::Json);
        assert!(!config.reaction_bot);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("REACTION_BOT", "maybe"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "REACTION_BOT", .. })
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("START_IMG_URL", "not a url"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "START_IMG_URL", .. })
        ));
    }
}
