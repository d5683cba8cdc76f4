//! Command-line arguments.

use std::path::PathBuf;

use carebot_telemetry::DeployEnv;
use clap::{Parser, Subcommand};

/// Carebot - answers questions about your PDF documents, one conversation at a time
#[derive(Parser, Debug)]
#[command(name = "carebot", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./carebot.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing the PDF knowledge base
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Deployment environment: dev (debug logs) or prod (info logs)
    #[arg(long, global = true)]
    pub deploy_env: Option<DeployEnv>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start an interactive conversation (default)
    Chat {
        /// Resume or name a session instead of starting a fresh one
        #[arg(long)]
        session: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        question: String,

        #[arg(long)]
        session: Option<String>,
    },

    /// Build the index and print corpus statistics
    Index,
}

impl Cli {
    /// The subcommand to run; a bare `carebot` starts a chat.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat { session: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_defaults_to_chat() {
        let cli = Cli::try_parse_from(["carebot"]).unwrap();
        assert_eq!(cli.command(), Command::Chat { session: None });
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "carebot",
            "ask",
            "How is diabetes treated?",
            "--deploy-env",
            "prod",
            "--data-dir",
            "pdfs",
        ])
        .unwrap();
        assert_eq!(cli.deploy_env, Some(DeployEnv::Prod));
        assert_eq!(cli.data_dir, Some(PathBuf::from("pdfs")));
        assert_eq!(
            cli.command(),
            Command::Ask { question: "How is diabetes treated?".into(), session: None }
        );
    }

    #[test]
    fn invalid_deploy_env_is_rejected() {
        assert!(Cli::try_parse_from(["carebot", "--deploy-env", "staging"]).is_err());
    }
}
