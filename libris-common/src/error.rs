//! Common error types for Libris

use thiserror::Error;

/// Common result type for Libris operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Libris crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored identifier failed to parse as a UUID
    #[error("UUID parse error: {0}")]
    Uuid(#[from] uuid::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
