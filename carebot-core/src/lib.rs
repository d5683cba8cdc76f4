//! Shared building blocks for the Carebot workspace.
//!
//! This crate holds the types every other crate agrees on:
//!
//! - [`ChatMessage`] and [`Role`] - one message of a conversation
//! - [`CompletionModel`] - the text-completion service behind rewriting and answering
//! - [`ModelError`] - failures reported by a completion service

pub mod error;
pub mod message;
pub mod model;

pub use error::{ModelError, Result};
pub use message::{ChatMessage, Role};
pub use model::{CompletionModel, CompletionRequest};
