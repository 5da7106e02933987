//! Database models.

pub mod active_chat;
pub mod flag_record;

pub use active_chat::ActiveChat;
pub use flag_record::FlagRecord;
