//! Inline keyboard callback payloads.
//!
//! Every button the bot renders carries one of these, encoded with
//! `Display` and decoded with `FromStr`:
//!
//! - `reaction_enable:<chat_id>` / `reaction_disable:<chat_id>`
//! - `vc_audio_page_<n>` / `vc_video_page_<n>`
//! - `vc_refresh_manual`, `vc_enable_autorefresh`, `vc_stop_autorefresh`, `vc_close`

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Which call list a stats page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Audio,
    Video,
}

impl CallKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    ReactionToggle { chat_id: i64, enable: bool },
    VcPage { kind: CallKind, page: usize },
    VcRefresh,
    VcAutoRefresh,
    VcStopAutoRefresh,
    VcClose,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackParseError {
    #[error("unknown callback payload {0:?}")]
    Unknown(String),

    #[error("callback payload {0:?} has an invalid chat id")]
    ChatId(String),

    #[error("callback payload {0:?} has an invalid page number")]
    Page(String),
}

impl FromStr for CallbackData {
    type Err = CallbackParseError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data {
            "vc_refresh_manual" => return Ok(Self::VcRefresh),
            "vc_enable_autorefresh" => return Ok(Self::VcAutoRefresh),
            "vc_stop_autorefresh" => return Ok(Self::VcStopAutoRefresh),
            "vc_close" => return Ok(Self::VcClose),
            _ => {}
        }

        if let Some((action, chat)) = data.split_once(':') {
            let enable = match action {
                "reaction_enable" => true,
                "reaction_disable" => false,
                _ => return Err(CallbackParseError::Unknown(data.to_string())),
            };
            let chat_id = chat
                .parse()
                .map_err(|_| CallbackParseError::ChatId(data.to_string()))?;
            return Ok(Self::ReactionToggle { chat_id, enable });
        }

        let (kind, page) = if let Some(page) = data.strip_prefix("vc_audio_page_") {
            (CallKind::Audio, page)
        } else if let Some(page) = data.strip_prefix("vc_video_page_") {
            (CallKind::Video, page)
        } else {
            return Err(CallbackParseError::Unknown(data.to_string()));
        };

        let page = page
            .parse()
            .map_err(|_| CallbackParseError::Page(data.to_string()))?;
        Ok(Self::VcPage { kind, page })
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReactionToggle { chat_id, enable } => {
                let action = if *enable { "enable" } else { "disable" };
                write!(f, "reaction_{action}:{chat_id}")
            }
            Self::VcPage { kind, page } => write!(f, "vc_{}_page_{}", kind.tag(), page),
            Self::VcRefresh => f.write_str("vc_refresh_manual"),
            Self::VcAutoRefresh => f.write_str("vc_enable_autorefresh"),
            Self::VcStopAutoRefresh => f.write_str("vc_stop_autorefresh"),
            Self::VcClose => f.write_str("vc_close"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reaction_toggles() {
        assert_eq!(
            "reaction_disable:-1001234".parse(),
            Ok(CallbackData::ReactionToggle {
                chat_id: -1001234,
                enable: false
            })
        );
        assert_eq!(
            CallbackData::ReactionToggle {
                chat_id: 5,
                enable: true
            }
            .to_string(),
            "reaction_enable:5"
        );
    }

    #[test]
    fn parses_page_requests() {
        assert_eq!(
            "vc_video_page_3".parse(),
            Ok(CallbackData::VcPage {
                kind: CallKind::Video,
                page: 3
            })
        );
        // Page 0 parses; the range check belongs to pagination.
        assert_eq!(
            "vc_audio_page_0".parse::<CallbackData>(),
            Ok(CallbackData::VcPage {
                kind: CallKind::Audio,
                page: 0
            })
        );
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert_eq!(
            "vc_audio_page_two".parse::<CallbackData>(),
            Err(CallbackParseError::Page("vc_audio_page_two".into()))
        );
        assert_eq!(
            "vc_audio_page_-1".parse::<CallbackData>(),
            Err(CallbackParseError::Page("vc_audio_page_-1".into()))
        );
        assert_eq!(
            "reaction_enable:abc".parse::<CallbackData>(),
            Err(CallbackParseError::ChatId("reaction_enable:abc".into()))
        );
        assert_eq!(
            "reaction_toggle:1".parse::<CallbackData>(),
            Err(CallbackParseError::Unknown("reaction_toggle:1".into()))
        );
        assert!("help_menu".parse::<CallbackData>().is_err());
    }

    #[test]
    fn stop_button_matches_the_stop_handler() {
        assert_eq!(CallbackData::VcStopAutoRefresh.to_string(), "vc_stop_autorefresh");
        assert_eq!("vc_stop_autorefresh".parse(), Ok(CallbackData::VcStopAutoRefresh));
    }
}
