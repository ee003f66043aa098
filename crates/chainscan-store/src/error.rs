//! Error types for store operations.

use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by settings stores and unique checkers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the backing database failed.
    #[error("failed to connect to {backend} store")]
    Connect {
        /// Backend identifier (`sqlite`, `mysql`).
        backend: &'static str,
        /// Source database error.
        source: sqlx::Error,
    },
    /// A query against the backing database failed.
    #[error("store query failed during {operation}")]
    Query {
        /// Operation identifier.
        operation: &'static str,
        /// Source database error.
        source: sqlx::Error,
    },
    /// A configured table name was not a plain identifier.
    #[error("invalid table name '{table}'")]
    InvalidTableName {
        /// Offending table name.
        table: String,
    },
}
