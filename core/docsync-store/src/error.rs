//! Error types for store reads.

use docsync_types::RecordId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading from the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity or authentication failure. No partial results are
    /// returned alongside it.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be decoded into a record.
    #[error("failed to decode record{}: {reason}", fmt_id(.id))]
    Decode {
        id: Option<RecordId>,
        reason: String,
    },

    /// The store connection settings are unusable.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

fn fmt_id(id: &Option<RecordId>) -> String {
    id.as_ref().map(|id| format!(" {id}")).unwrap_or_default()
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
