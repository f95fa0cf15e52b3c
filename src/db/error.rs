// Store errors. "Not found" is never an error — lookups return Option and the
// caller decides what absence means.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field (username, email) is already held by another row.
    #[error("{field} '{value}' is already taken")]
    DuplicateKey { field: &'static str, value: String },

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
