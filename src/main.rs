//! Ouroboros Engine CLI entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use ouroboros_engine::adapters::memory::InMemoryStorage;
use ouroboros_engine::adapters::sqlite::{create_pool, PoolConfig, SqliteStorage};
use ouroboros_engine::adapters::web::{HttpWebClient, NoopWebClient};
use ouroboros_engine::cli::commands::{artifact, experience, followup, questions, trajectory};
use ouroboros_engine::cli::{Cli, Commands};
use ouroboros_engine::domain::models::Config;
use ouroboros_engine::domain::ports::{Storage, WebClient};
use ouroboros_engine::infrastructure::config::ConfigLoader;
use ouroboros_engine::infrastructure::logging;
use ouroboros_engine::services::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::load().context("failed to load configuration")?;

    let _logger_guard = logging::init(&config.logging).context("failed to initialize logging")?;

    let storage = build_storage(&config).await?;
    let web_client = build_web_client(&config)?;
    let orchestrator = Orchestrator::new(storage.clone(), web_client);

    match cli.command {
        Commands::Experience(cmd) => experience::handle(&orchestrator, cmd, cli.json).await?,
        Commands::FollowUp(cmd) => followup::handle(&orchestrator, cmd, cli.json).await?,
        Commands::Artifact(cmd) => artifact::handle(&orchestrator, cmd, cli.json).await?,
        Commands::Questions(cmd) => questions::handle(&storage, cmd, cli.json).await?,
        Commands::Trajectory(cmd) => trajectory::handle(&storage, cmd, cli.json).await?,
    }

    Ok(())
}

async fn build_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    match config.storage.backend.as_str() {
        "sqlite" => {
            let pool = create_pool(&config.storage.sqlite_path, &PoolConfig::default())
                .await
                .context("failed to connect to sqlite database")?;
            let storage = SqliteStorage::new(pool).await.context("failed to run sqlite migrations")?;
            Ok(Arc::new(storage))
        }
        _ => Ok(Arc::new(InMemoryStorage::new())),
    }
}

fn build_web_client(config: &Config) -> Result<Option<Arc<dyn WebClient>>> {
    match config.web_client.backend.as_str() {
        "http" => {
            let client = HttpWebClient::new(&config.web_client).context("failed to build http web client")?;
            Ok(Some(Arc::new(client)))
        }
        "noop" => Ok(Some(Arc::new(NoopWebClient))),
        _ => Ok(None),
    }
}
