use serde::{Deserialize, Serialize};

/// Reachability of an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum Health {
    Available,
    Unreachable(String),
}

impl Health {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}
