// ── Core error types ──
//
// User-facing errors from staylist-core. Consumers never see reqwest
// errors or JSON decoding failures directly: the `From<staylist_api::Error>`
// impl translates transport-layer errors into domain variants.

use std::time::Duration;

use thiserror::Error;

use crate::model::{EntityKind, ItemId};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store errors ─────────────────────────────────────────────────
    #[error("Store unreachable: {reason}")]
    Network { reason: String },

    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Store rejected the request (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Favorite sync errors ─────────────────────────────────────────
    #[error("{kind} item {id} is not loaded in any open view")]
    ItemNotFound { kind: EntityKind, id: ItemId },

    #[error(
        "Write to {kind}/{id} did not settle within {}",
        humantime::format_duration(*.timeout)
    )]
    StaleWriteTimeout {
        kind: EntityKind,
        id: ItemId,
        timeout: Duration,
    },

    #[error("Could not update favorite for {kind}/{id}: {reason}")]
    ToggleFailed {
        kind: EntityKind,
        id: ItemId,
        #[source]
        reason: Box<CoreError>,
    },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("View has been closed")]
    ViewClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Root cause of a failed toggle; `self` for every other variant.
    pub fn root_reason(&self) -> &CoreError {
        match self {
            Self::ToggleFailed { reason, .. } => reason.root_reason(),
            other => other,
        }
    }

    /// Whether the failure came from talking to the store (as opposed to
    /// local state or input).
    pub fn is_remote(&self) -> bool {
        matches!(
            self.root_reason(),
            Self::Network { .. }
                | Self::NotFound { .. }
                | Self::Server { .. }
                | Self::StaleWriteTimeout { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<staylist_api::Error> for CoreError {
    fn from(err: staylist_api::Error) -> Self {
        match err {
            staylist_api::Error::Transport(ref e) => match e.status() {
                Some(status) => CoreError::Server {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => CoreError::Network {
                    reason: e.to_string(),
                },
            },
            staylist_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid store URL: {e}"),
            },
            staylist_api::Error::Timeout { timeout_secs } => CoreError::Network {
                reason: format!("request timed out after {timeout_secs}s"),
            },
            staylist_api::Error::Tls(msg) => CoreError::Network {
                reason: format!("TLS error: {msg}"),
            },
            staylist_api::Error::NotFound { collection, id } => {
                CoreError::NotFound { collection, id }
            }
            staylist_api::Error::Server { status, message } => {
                CoreError::Server { status, message }
            }
            staylist_api::Error::Deserialization { message, .. } => {
                CoreError::Internal(format!("Malformed store response: {message}"))
            }
        }
    }
}
