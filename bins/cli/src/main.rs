//! Conciliar command-line driver.
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use conciliar_cli::{Cli, Commands, Session, build_workflow, logging};
use conciliar_core::reconciliation::WorkflowContext;
use conciliar_core::store::{MemoryStore, WorkflowStore};
use conciliar_db::{WorkflowRepository, connect_with};
use conciliar_shared::AppConfig;
use conciliar_shared::types::{TenantId, UserId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging);

    let tenant = cli
        .tenant
        .map(TenantId::from_uuid)
        .context("--tenant or CONCILIAR_TENANT is required")?;
    let user = cli
        .user
        .map(UserId::from_uuid)
        .context("--user or CONCILIAR_USER is required")?;
    let ctx = WorkflowContext::new(tenant, user);

    let output = match &config.database {
        Some(database) => {
            let db = connect_with(database).await?;
            info!("Connected to database");
            run(WorkflowRepository::new(db), &config, ctx, cli.command).await?
        }
        None => {
            warn!("No database configured; changes are kept in memory and lost on exit");
            run(MemoryStore::new(), &config, ctx, cli.command).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run<S: WorkflowStore>(
    store: S,
    config: &AppConfig,
    ctx: WorkflowContext,
    command: Commands,
) -> anyhow::Result<serde_json::Value> {
    let session = Session::new(build_workflow(store, config)?, ctx);
    session.run(command).await
}
