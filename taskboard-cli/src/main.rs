use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskboard_core::TaskService;
use taskboard_http::{AppState, HttpConfig, router, shutdown_signal};
use taskboard_store::SqliteGateway;

#[derive(Parser, Debug)]
#[command(name = "taskboard", version)]
#[command(about = "Taskboard - task tracking service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
        /// Path to the SQLite database file (created on first run)
        #[arg(long, default_value = "taskboard.db")]
        database: PathBuf,
        /// Disable permissive CORS
        #[arg(long)]
        no_cors: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            addr,
            database,
            no_cors,
        } => serve(addr, database, no_cors).await,
    }
}

async fn serve(
    addr: SocketAddr,
    database: PathBuf,
    no_cors: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = SqliteGateway::open(&database)?;
    info!(database = %database.display(), "store opened, schema up to date");

    let state = AppState::new(TaskService::new(gateway));

    let mut config = HttpConfig::from_env()?;
    if no_cors {
        config.enable_cors = false;
    }

    let app = router(state, &config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "taskboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}
