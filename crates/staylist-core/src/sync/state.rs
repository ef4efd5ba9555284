// ── Toggle lifecycle ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{CatalogItem, EntityKind, ItemId};

/// Where a record's favorite flag stands with respect to the store.
///
/// `Idle` means the locally shown value came from the store. Records
/// leave `Idle` when a toggle starts and move to `Settled` when the
/// write is confirmed or rolled back.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleState {
    Idle,
    /// A write is in flight; every holder already shows `target`.
    Pending {
        target: bool,
        previous: bool,
        item: Arc<CatalogItem>,
    },
    /// The last toggle finished. `reverted` is set when the write failed
    /// and `value` is the restored flag.
    Settled {
        value: bool,
        reverted: bool,
        epoch: u64,
        item: Arc<CatalogItem>,
    },
}

impl ToggleState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Result of a confirmed toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub kind: EntityKind,
    pub id: ItemId,
    pub is_favorite: bool,
}

/// Notifications emitted by the sync engine, in order per record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SyncEvent {
    /// The optimistic value is now shown everywhere.
    Applied {
        kind: EntityKind,
        id: ItemId,
        is_favorite: bool,
        at: DateTime<Utc>,
    },
    /// The store accepted the write.
    Confirmed {
        kind: EntityKind,
        id: ItemId,
        is_favorite: bool,
        at: DateTime<Utc>,
    },
    /// The write failed or timed out; `is_favorite` is the restored value.
    RolledBack {
        kind: EntityKind,
        id: ItemId,
        is_favorite: bool,
        reason: String,
        at: DateTime<Utc>,
    },
}

impl SyncEvent {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Applied { kind, .. }
            | Self::Confirmed { kind, .. }
            | Self::RolledBack { kind, .. } => *kind,
        }
    }

    pub fn id(&self) -> &ItemId {
        match self {
            Self::Applied { id, .. } | Self::Confirmed { id, .. } | Self::RolledBack { id, .. } => {
                id
            }
        }
    }
}
