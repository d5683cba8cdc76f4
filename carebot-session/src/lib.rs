//! # carebot-session
//!
//! Per-session conversation state for Carebot.
//!
//! A [`SessionStore`] maps opaque session ids to a [`ConversationHistory`] of
//! completed [`Turn`]s. Histories are created on first use and kept for the
//! lifetime of the process. [`SessionStore::lock`] hands out a
//! [`SessionGuard`] that keeps other turns of the same session waiting, which
//! is how a turn appends its result only after every stage has succeeded.

mod history;
mod store;

pub use history::{ConversationHistory, Turn};
pub use store::{SessionGuard, SessionStore};
