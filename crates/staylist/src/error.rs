//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use staylist_config::ConfigError;
use staylist_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the catalog store: {reason}")]
    #[diagnostic(
        code(staylist::store_unreachable),
        help(
            "Check that the store is running and accessible.\n\
             Try: staylist --url http://localhost:3001 list accommodations"
        )
    )]
    StoreUnreachable { reason: String },

    #[error("Could not load {what}: {message}")]
    #[diagnostic(
        code(staylist::load_failed),
        help("Nothing was changed. Retry once the store is reachable.")
    )]
    LoadFailed { what: String, message: String },

    // ── Records ──────────────────────────────────────────────────────

    #[error("{kind} '{id}' not found")]
    #[diagnostic(
        code(staylist::not_found),
        help("Run: staylist list {kind} --all to see available ids")
    )]
    NotFound { kind: String, id: String },

    // ── Store ────────────────────────────────────────────────────────

    #[error("Store error ({status}): {message}")]
    #[diagnostic(code(staylist::store_error))]
    Store { status: u16, message: String },

    // ── Favorites ────────────────────────────────────────────────────

    #[error("Favorite change on {target} was rolled back")]
    #[diagnostic(code(staylist::rolled_back))]
    RolledBack {
        target: String,
        #[source]
        source: Box<CliError>,
    },

    #[error("{failed} of {total} favorite changes were rolled back")]
    #[diagnostic(
        code(staylist::partial_toggle),
        help("The other changes were saved. Details are printed above.")
    )]
    PartialToggle { failed: usize, total: usize },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(staylist::timeout),
        help("Increase the deadline with --write-timeout or check store responsiveness.")
    )]
    Timeout { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(staylist::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(staylist::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(staylist::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(staylist::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(staylist::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(staylist::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(staylist::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StoreUnreachable { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::RolledBack { source, .. } => source.exit_code(),
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { reason } => CliError::StoreUnreachable { reason },

            CoreError::NotFound { collection, id } => CliError::NotFound {
                kind: collection,
                id,
            },

            CoreError::ItemNotFound { kind, id } => CliError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            },

            CoreError::Server { status, message } => CliError::Store { status, message },

            err @ CoreError::StaleWriteTimeout { .. } => CliError::Timeout {
                message: err.to_string(),
            },

            CoreError::ToggleFailed { kind, id, reason } => CliError::RolledBack {
                target: format!("{kind}/{id}"),
                source: Box::new(CliError::from(*reason)),
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "filter".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::ViewClosed => CliError::Internal("view closed before it finished".into()),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use staylist_core::{EntityKind, ItemId};

    use super::*;

    #[test]
    fn rolled_back_toggle_keeps_the_cause_exit_code() {
        let timeout = CoreError::StaleWriteTimeout {
            kind: EntityKind::Chefs,
            id: ItemId::from(4),
            timeout: Duration::from_secs(10),
        };
        let err = CliError::from(CoreError::ToggleFailed {
            kind: EntityKind::Chefs,
            id: ItemId::from(4),
            reason: Box::new(timeout),
        });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(err.to_string(), "Favorite change on chefs/4 was rolled back");

        let err = CliError::from(CoreError::ToggleFailed {
            kind: EntityKind::Chefs,
            id: ItemId::from(4),
            reason: Box::new(CoreError::Network {
                reason: "connection refused".into(),
            }),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn missing_record_is_not_found() {
        let err = CliError::from(CoreError::ItemNotFound {
            kind: EntityKind::Popular,
            id: ItemId::from("x1"),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "popular 'x1' not found");
    }
}
