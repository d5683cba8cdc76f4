use anyhow::{Context, Result};
use carebot_cli::app::{bootstrap, build_knowledge_base};
use carebot_cli::console::{format_sources, print_response, run_console};
use carebot_cli::{AppConfig, Cli, Command};
use carebot_session::SessionStore;
use carebot_telemetry::init_logging;
use clap::Parser;
use tracing::{error, info};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = load_config(&cli)?;
    let _log_guard = init_logging(&config.logging).context("failed to initialise logging")?;
    info!(deploy_env = %config.logging.deploy_env, "Starting the main application.");

    let result = run(cli.command(), &config).await;
    if let Err(e) = &result {
        error!(error = %e, "application failed");
    }
    result
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env()?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(deploy_env) = cli.deploy_env {
        config.logging.deploy_env = deploy_env;
    }
    config.validate()?;
    Ok(config)
}

async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Index => {
            let knowledge = build_knowledge_base(config).await?;
            println!("data directory : {}", config.data_dir.display());
            println!("pages loaded   : {}", knowledge.document_count);
            println!("chunks indexed : {}", knowledge.index.len());
            println!(
                "embeddings     : {} ({} dimensions)",
                knowledge.pipeline.embedding_provider().name(),
                knowledge.index.dimensions()
            );
            Ok(())
        }
        Command::Ask { question, session } => {
            let orchestrator = bootstrap(config).await?;
            let sessions = SessionStore::new();
            let session_id = session.unwrap_or_else(|| Uuid::new_v4().to_string());
            let response = orchestrator.handle_turn(&sessions, &session_id, &question).await?;
            print_response(&response);
            println!("\nSources:\n{}", format_sources(&response.sources));
            Ok(())
        }
        Command::Chat { session } => {
            let orchestrator = bootstrap(config).await?;
            info!("Application initialized successfully.");
            let sessions = SessionStore::new();
            let session_id = session.unwrap_or_else(|| Uuid::new_v4().to_string());
            run_console(&orchestrator, &sessions, &session_id).await
        }
    }
}
