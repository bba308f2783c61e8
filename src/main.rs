//! Calda
//!
//! An MCP server for agricultural spray-mix calculations.

use calda::config::{Config, DEFAULT_LOG_DIRECTIVE};
use calda::{build_info, db, mcp::CaldaService};
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let config = Config::from_env();
    tracing::info!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&config.database_path)?;
    let version = db::migrations::migrate(&database)?;
    tracing::info!("Database schema version: {}", version);

    let service = CaldaService::new(config.database_path, database);

    tracing::info!("Serving {} tools on stdio", build_info::BuildInfo::current().label());
    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
