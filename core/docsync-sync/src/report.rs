//! Run states and reports.

use crate::error::{SyncError, SyncErrorKind};
use chrono::{DateTime, Utc};
use docsync_store::DecodeFailure;
use docsync_types::TaskHandle;
use serde::Serialize;
use uuid::Uuid;

/// Where the orchestrator is in its linear run.
///
/// `Idle -> Fetching -> (Fetched | FetchFailed) -> Writing -> (Done | WriteFailed)`,
/// with `Fetched -> Done` when the batch is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    Idle,
    Fetching,
    Fetched,
    FetchFailed,
    Writing,
    Done,
    WriteFailed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::FetchFailed | Self::WriteFailed)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub run_id: Uuid,
    pub index: String,
    pub records_indexed: usize,
    /// Documents left out under the skip decode policy.
    pub rejected: Vec<DecodeFailure>,
    /// Absent when nothing was selected and the writer was not called.
    pub task: Option<TaskHandle>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Structured description of a failed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub kind: SyncErrorKind,
    pub record_id: Option<String>,
    pub message: String,
}

impl From<&SyncError> for SyncFailure {
    fn from(e: &SyncError) -> Self {
        Self {
            kind: e.kind(),
            record_id: e.record_id().map(|id| id.to_string()),
            message: e.to_string(),
        }
    }
}
