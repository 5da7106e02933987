//! Utility functions.
//!
//! Collection of helpers shared by plugins and events.

pub mod callback;
pub mod edit;
pub mod emoji;
pub mod pagination;

pub use callback::{CallKind, CallbackData, CallbackParseError};
pub use edit::{safe_edit, EditTarget};
pub use emoji::EmojiPicker;
pub use pagination::{paginate, Page, PAGE_SIZE};
