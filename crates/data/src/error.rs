//! Storage errors.

use thiserror::Error;

/// Failure talking to or writing into the stats database.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Could not establish a connection pool.
    #[error("failed to connect to database: {0}")]
    Connect(String),

    /// A statement or transaction failed; the batch was rolled back.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
