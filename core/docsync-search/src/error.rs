//! Index submission error types.

use thiserror::Error;

/// Result type for search-engine operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur while talking to the search engine.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The engine answered with a non-success status.
    #[error("search engine rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never got a usable answer.
    #[error("network error: {0}")]
    Network(String),

    /// A record could not be turned into a search document.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document in the batch has no usable primary-key value.
    #[error("document is missing primary key field {field}")]
    MissingPrimaryKey { field: String },

    /// Writers only accept non-empty batches.
    #[error("refusing to submit an empty batch")]
    EmptyBatch,

    #[error("invalid search engine configuration: {0}")]
    Config(String),
}

impl IndexError {
    /// Returns true for authentication/authorization rejections.
    pub fn is_auth(&self) -> bool {
        matches!(self, IndexError::Rejected { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for IndexError {
    fn from(e: reqwest::Error) -> Self {
        IndexError::Network(e.to_string())
    }
}
