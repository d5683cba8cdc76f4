//! # carebot-model
//!
//! Completion services for Carebot.
//!
//! - [`OpenAICompatibleClient`] - any `/chat/completions` server; Groq by default
//! - [`MockCompletionModel`] - scripted replies for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use carebot_model::{OpenAICompatibleClient, OpenAICompatibleConfig};
//!
//! let model = OpenAICompatibleClient::new(OpenAICompatibleConfig::groq(
//!     std::env::var("GROQ_API_KEY")?,
//!     "llama-3.1-8b-instant",
//! ))?;
//! ```

mod client;
mod config;
mod convert;
pub mod mock;

pub use client::OpenAICompatibleClient;
pub use config::{DEFAULT_MODEL, GROQ_API_BASE, OpenAICompatibleConfig};
pub use mock::MockCompletionModel;
