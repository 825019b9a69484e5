//! Search-engine task handles and search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an asynchronous indexing task on the search-engine side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Returns true once the task can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Enqueued => "enqueued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// Opaque reference to an indexing operation accepted by the search engine.
///
/// Holding a handle only means the submission was acknowledged; the
/// documents may not be searchable yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    /// Engine-assigned task number. The enqueue response calls it
    /// `taskUid`, the task endpoint calls it `uid`.
    #[serde(alias = "uid")]
    pub task_uid: u64,
    /// Index the task targets. Engine-wide tasks (dumps, swaps) have none.
    #[serde(default)]
    pub index_uid: Option<String>,
    /// Status at the time the handle was produced.
    pub status: TaskStatus,
    /// Engine task type, e.g. `documentAdditionOrUpdate`.
    #[serde(rename = "type")]
    pub kind: String,
    /// When the engine enqueued the task.
    pub enqueued_at: DateTime<Utc>,
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {} on {} ({}, {})",
            self.task_uid,
            self.index_uid.as_deref().unwrap_or("-"),
            self.kind,
            self.status
        )
    }
}

/// Hits returned by a search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub hits: Vec<serde_json::Value>,
    pub query: String,
    #[serde(default)]
    pub processing_time_ms: u64,
    #[serde(default)]
    pub estimated_total_hits: Option<u64>,
}
