use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hub_agents::clients::{HttpAccountService, HttpKnowledgeService, HttpMemoryService};
use hub_agents::gateway::OpenAiGateway;
use hub_agents::{Collaborators, HubConfig, Ticket, WorkflowEngine};

/// Run one support ticket through the routing workflow.
#[derive(Parser)]
#[command(name = "hub-agents", version)]
struct Cli {
    /// Path to a JSON file holding the ticket record.
    #[arg(long)]
    ticket: PathBuf,

    /// Session key for this run (defaults to the ticket id).
    #[arg(long)]
    thread_id: Option<String>,

    /// Optional TOML config file; environment defaults apply otherwise.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HubConfig::from_file(path)?,
        None => HubConfig::default(),
    };
    info!(
        gateway = %config.gateway.url,
        kb = %config.kb_url,
        "ticket hub starting"
    );

    let raw = std::fs::read_to_string(&cli.ticket)
        .with_context(|| format!("failed to read ticket file {}", cli.ticket.display()))?;
    let ticket: Ticket = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse ticket file {}", cli.ticket.display()))?;

    let thread_id = cli
        .thread_id
        .clone()
        .unwrap_or_else(|| ticket.ticket_id.clone());

    let timeout = config.request_timeout();
    let deps = Collaborators {
        gateway: Arc::new(OpenAiGateway::new(&config.gateway, timeout)?),
        knowledge: Arc::new(HttpKnowledgeService::new(&config.kb_url, timeout)?),
        accounts: Arc::new(HttpAccountService::new(&config.account_url, timeout)?),
        memory: Arc::new(HttpMemoryService::new(&config.memory_url, timeout)?),
    };

    let engine = WorkflowEngine::new(deps, config);
    let state = engine.run_ticket(ticket, &thread_id).await?;

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
