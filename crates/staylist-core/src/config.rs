// ── Runtime store configuration ──
//
// Describes *where* the store lives and how the sync engine and views
// behave. Never touches disk: the CLI builds a `StoreConfig` from the
// config file, environment and flags, then hands it in.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::model::{EntityKind, WriteMode};

/// Default store location for local development.
pub const DEFAULT_STORE_URL: &str = "http://localhost:3001";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development stores).
    DangerAcceptInvalid,
}

/// Configuration for talking to one store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store base URL (e.g., `http://localhost:3001`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request transport timeout.
    pub timeout: Duration,
    /// Deadline for one favorite write, including the read in replace mode.
    /// An unsettled write past this point is rolled back.
    pub write_timeout: Duration,
    /// How often the favorites counter re-polls the store.
    pub poll_interval: Duration,
    /// Page size overrides; kinds not present use their default.
    pub page_sizes: HashMap<EntityKind, usize>,
    /// Write discipline overrides; kinds not present use their default.
    pub write_modes: HashMap<EntityKind, WriteMode>,
}

impl StoreConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(3),
            page_sizes: HashMap::new(),
            write_modes: HashMap::new(),
        }
    }

    pub fn items_per_page(&self, kind: EntityKind) -> usize {
        self.page_sizes
            .get(&kind)
            .copied()
            .filter(|n| *n > 0)
            .unwrap_or_else(|| kind.default_items_per_page())
    }

    pub fn write_mode(&self, kind: EntityKind) -> WriteMode {
        self.write_modes
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_write_mode())
    }
}
