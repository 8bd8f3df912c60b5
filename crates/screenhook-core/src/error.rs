//! Error types for the persistence gateway.
//!
//! The gateway has exactly two failure modes per request: the connection
//! never opens, or it opens and the insert fails. The HTTP layer maps
//! each variant to its own response body.

use thiserror::Error;

/// Result type alias using `PersistError`.
pub type Result<T> = std::result::Result<T, PersistError>;

/// Terminal outcomes of the single-insert persistence path.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Could not establish a database connection; no insert was attempted.
    #[error("unable to establish a connection: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// The statement failed after a successful connection.
    #[error("error executing the query: {0}")]
    ExecutionFailed(#[source] sqlx::Error),
}

impl PersistError {
    /// Returns whether the failure happened before any statement ran.
    ///
    /// Connection failures leave the database untouched; execution
    /// failures reached the server but inserted nothing.
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_))
    }
}
