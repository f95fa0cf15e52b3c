use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use quillspace::config::{self, StorageBackend};
use quillspace::db::{self, DataStore};

/// QuillSpace: a small publishing platform.
///
/// Serves users, articles, comments, follows, bookmarks and likes over a
/// JSON API, backed by process memory or a SQLite file.
#[derive(Parser)]
#[command(name = "quillspace", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: PORT env var, then 5000)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: QUILLSPACE_BIND env var, then 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Create the SQLite database and load the sample data
    Init,

    /// Show storage backend and row counts
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quillspace=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = config::Config::load()?;
            let store = init_store(&config).await?;
            let port = port.unwrap_or(config.port);
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            info!(storage = config.storage_label(), "Starting QuillSpace API");
            quillspace::web::run_server(store, port, &bind).await?;
        }

        Commands::Init => {
            let config = config::Config::load()?;
            if config.storage == StorageBackend::Memory {
                println!(
                    "{}",
                    "QUILLSPACE_STORAGE is memory; nothing to initialize.".yellow()
                );
                println!("Set QUILLSPACE_STORAGE=sqlite to persist data to a file.");
                return Ok(());
            }
            info!("Initializing QuillSpace database...");
            let store = init_store(&config).await?;
            let stats = store.stats().await?;
            println!("Database initialized at: {}", config.db_path);
            println!(
                "Users: {}   Articles: {}",
                stats.users, stats.articles
            );
            println!("\nQuillSpace is ready. Run: cargo run -- serve");
        }

        Commands::Status => {
            let config = config::Config::load()?;
            let store = open_store(&config).await?;
            quillspace::status::show(&config, &store).await?;
        }
    }

    Ok(())
}

/// Open the configured store, creating it if needed, and load the sample
/// data into it when it's empty and seeding is enabled.
async fn init_store(config: &config::Config) -> Result<Arc<dyn DataStore>> {
    let store = match config.storage {
        StorageBackend::Memory => return Ok(db::open_memory(config.seed_sample_data)),
        StorageBackend::Sqlite => initialize_sqlite(config)?,
    };
    if config.seed_sample_data {
        db::seed::seed_if_empty(store.as_ref()).await?;
    }
    Ok(store)
}

/// Open the configured store without creating anything.
async fn open_store(config: &config::Config) -> Result<Arc<dyn DataStore>> {
    match config.storage {
        StorageBackend::Memory => Ok(db::open_memory(config.seed_sample_data)),
        StorageBackend::Sqlite => open_sqlite(config),
    }
}

#[cfg(feature = "sqlite")]
fn initialize_sqlite(config: &config::Config) -> Result<Arc<dyn DataStore>> {
    info!("Using SQLite backend at {}", config.db_path);
    db::initialize_sqlite(&config.db_path)
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &config::Config) -> Result<Arc<dyn DataStore>> {
    db::open_sqlite(&config.db_path)
}

#[cfg(not(feature = "sqlite"))]
fn initialize_sqlite(_config: &config::Config) -> Result<Arc<dyn DataStore>> {
    anyhow::bail!(
        "QUILLSPACE_STORAGE=sqlite but the 'sqlite' feature is not compiled in.\n\
         Rebuild with: cargo build --features sqlite"
    )
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(config: &config::Config) -> Result<Arc<dyn DataStore>> {
    initialize_sqlite(config)
}
