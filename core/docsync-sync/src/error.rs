//! Error taxonomy for sync runs.

use docsync_search::IndexError;
use docsync_store::{QueryError, StoreError};
use docsync_types::RecordId;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by a sync run. None are retried internally.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The store could not be reached or refused the query.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored document could not be decoded.
    #[error("failed to decode record{}: {reason}", fmt_id(.id))]
    RecordDecode {
        id: Option<RecordId>,
        reason: String,
    },

    /// The search engine did not accept the batch.
    #[error("index submission failed: {0}")]
    IndexSubmission(#[source] IndexError),

    /// A required parameter is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Another run holds the single-flight guard.
    #[error("a sync run is already in progress")]
    RunInProgress,
}

fn fmt_id(id: &Option<RecordId>) -> String {
    id.as_ref().map(|id| format!(" {id}")).unwrap_or_default()
}

/// Taxonomy name of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncErrorKind {
    StoreUnavailable,
    #[serde(rename = "RecordDecodeError")]
    RecordDecode,
    #[serde(rename = "IndexSubmissionError")]
    IndexSubmission,
    #[serde(rename = "ConfigurationError")]
    Configuration,
    RunInProgress,
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StoreUnavailable => "StoreUnavailable",
            Self::RecordDecode => "RecordDecodeError",
            Self::IndexSubmission => "IndexSubmissionError",
            Self::Configuration => "ConfigurationError",
            Self::RunInProgress => "RunInProgress",
        };
        f.write_str(s)
    }
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            Self::StoreUnavailable(_) => SyncErrorKind::StoreUnavailable,
            Self::RecordDecode { .. } => SyncErrorKind::RecordDecode,
            Self::IndexSubmission(_) => SyncErrorKind::IndexSubmission,
            Self::Configuration(_) => SyncErrorKind::Configuration,
            Self::RunInProgress => SyncErrorKind::RunInProgress,
        }
    }

    /// The offending record, when the failure can be pinned to one.
    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            Self::RecordDecode { id, .. } => id.as_ref(),
            _ => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Decode { id, reason } => Self::RecordDecode { id, reason },
            StoreError::Config(msg) => Self::Configuration(msg),
        }
    }
}

impl From<IndexError> for SyncError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Config(msg) => Self::Configuration(msg),
            other => Self::IndexSubmission(other),
        }
    }
}

impl From<QueryError> for SyncError {
    fn from(e: QueryError) -> Self {
        Self::Configuration(e.to_string())
    }
}
