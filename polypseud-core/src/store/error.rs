//! Error type for the pseudonym store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the pseudonym store and its persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Persisting a record failed.
    #[error("store write error: {0}")]
    Write(String),

    /// Fetching a record failed (distinct from the record being absent).
    #[error("store read error: {0}")]
    Read(String),

    /// A persisted pseudonym string no longer decodes. Never auto-repaired.
    #[error("corrupt pseudonym record: {0}")]
    CorruptRecord(String),
}
