use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use family_budget_server::backend::storage::DbConnection;
use family_budget_server::backend::{create_router, initialize_backend};
use family_budget_server::config::Config;

#[derive(Debug, Parser)]
#[command(name = "family-budget-server")]
#[command(about = "Family budget tracker backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the REST API and the client bundle (default)
    Serve,
    /// Wait for the database, create it if missing and apply the schema
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let app_state = initialize_backend(&config).await?;
    let router = create_router(app_state, Some(config.static_dir.as_path()));

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🌐 Family budget server listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

async fn migrate(config: Config) -> Result<()> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to run migrations")?;

    DbConnection::bootstrap(url, config.connect_policy).await?;
    info!("✅ Database schema is up to date");
    Ok(())
}
