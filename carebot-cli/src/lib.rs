//! # carebot-cli
//!
//! The `carebot` binary: configuration, startup and the terminal front end.

pub mod app;
pub mod args;
pub mod config;
pub mod console;

pub use args::{Cli, Command};
pub use config::{AppConfig, ConfigError, EmbeddingConfig, EmbeddingKind};
