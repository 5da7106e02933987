//! Repository module - decentralized data access layer.

mod active_chat_repository;
mod flag_repository;

pub use active_chat_repository::{ActiveChatRepository, ActiveChatSource};
pub use flag_repository::FlagRepository;
