use chrono::{DateTime, Utc};
use serde::Serialize;

/// Progress of the most recent load of a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    Loading,
    Loaded { count: usize, at: DateTime<Utc> },
    /// The fetch failed; previously loaded records are still shown.
    Failed { message: String },
    /// The view was torn down; no further loads are applied.
    Closed,
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
