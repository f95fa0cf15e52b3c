use std::env;

use anyhow::Result;

/// Which storage backend holds the data.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// Process memory (default) — nothing survives a restart
    Memory,
    /// SQLite file at QUILLSPACE_DB_PATH
    Sqlite,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (QUILLSPACE_BIND).
    pub bind: String,
    /// HTTP port (PORT).
    pub port: u16,
    /// Which storage backend to use (QUILLSPACE_STORAGE, default: memory)
    pub storage: StorageBackend,
    pub db_path: String,
    /// Load the sample users and articles into an empty store (QUILLSPACE_SEED).
    pub seed_sample_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every field has a default; an unparseable PORT is an error rather
    /// than a silent fallback.
    pub fn load() -> Result<Self> {
        let storage = match env::var("QUILLSPACE_STORAGE").as_deref() {
            Ok("sqlite") => StorageBackend::Sqlite,
            Ok("memory") | Err(_) => StorageBackend::Memory,
            Ok(other) => anyhow::bail!(
                "Unknown QUILLSPACE_STORAGE value: {other}\n\
                 Expected \"memory\" or \"sqlite\"."
            ),
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a number between 0 and 65535, got {raw}"))?,
            Err(_) => 5000,
        };

        let seed_sample_data = !matches!(
            env::var("QUILLSPACE_SEED").as_deref(),
            Ok("0") | Ok("false") | Ok("no")
        );

        Ok(Self {
            bind: env::var("QUILLSPACE_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            storage,
            db_path: env::var("QUILLSPACE_DB_PATH")
                .unwrap_or_else(|_| "./quillspace.db".to_string()),
            seed_sample_data,
        })
    }

    /// Human-readable name of the storage backend, for logs and `status`.
    pub fn storage_label(&self) -> &'static str {
        match self.storage {
            StorageBackend::Memory => "memory",
            StorageBackend::Sqlite => "sqlite",
        }
    }
}
