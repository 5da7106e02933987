//! Bot module - Core bot functionality.

pub mod dispatcher;
mod runtime;
mod webhook;

pub use dispatcher::{build_dispatcher, AppState};
pub use runtime::run;
