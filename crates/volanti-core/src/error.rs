//! Error types for Volanti.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The catalog store could not be reached or the query failed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    /// The embedding provider failed (network, quota, malformed response).
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
