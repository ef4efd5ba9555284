//! Shared configuration for the staylist CLI.
//!
//! TOML file + `STAYLIST_*` environment layering, and translation into
//! `staylist_core::StoreConfig`. The CLI adds flag-aware overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use staylist_core::config::DEFAULT_STORE_URL;
use staylist_core::{EntityKind, StoreConfig, TlsVerification, WriteMode};

/// Prefix for environment overrides. Nested keys use `__`, e.g.
/// `STAYLIST_STORE__URL` or `STAYLIST_PAGES__CHEFS`.
pub const ENV_PREFIX: &str = "STAYLIST_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub sync: SyncSection,

    #[serde(default)]
    pub favorites: FavoritesSection,

    /// Items per page, by kind.
    #[serde(default)]
    pub pages: BTreeMap<EntityKind, usize>,

    /// How favorite changes are written, by kind.
    #[serde(default)]
    pub write_modes: BTreeMap<EntityKind, WriteMode>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreSection::default(),
            sync: SyncSection::default(),
            favorites: FavoritesSection::default(),
            pages: EntityKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.default_items_per_page()))
                .collect(),
            write_modes: EntityKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.default_write_mode()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreSection {
    /// Store base URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyncSection {
    /// Deadline for one favorite write before it is rolled back.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            write_timeout_secs: default_write_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FavoritesSection {
    /// Counter polling interval; also the bound on how stale it can be.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for FavoritesSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_STORE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_write_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    3
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "staylist", "staylist").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("staylist");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment. A missing file is
/// not an error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `StoreConfig` from loaded configuration.
pub fn to_store_config(cfg: &Config) -> Result<StoreConfig, ConfigError> {
    let url: url::Url = cfg.store.url.parse().map_err(|_| ConfigError::Validation {
        field: "store.url".into(),
        reason: format!("invalid URL: {}", cfg.store.url),
    })?;

    let tls = if cfg.store.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.store.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut store = StoreConfig::new(url);
    store.tls = tls;
    store.timeout = positive_secs("store.timeout_secs", cfg.store.timeout_secs)?;
    store.write_timeout = positive_secs("sync.write_timeout_secs", cfg.sync.write_timeout_secs)?;
    store.poll_interval = positive_secs(
        "favorites.poll_interval_secs",
        cfg.favorites.poll_interval_secs,
    )?;

    for (&kind, &size) in &cfg.pages {
        if size == 0 {
            return Err(ConfigError::Validation {
                field: format!("pages.{kind}"),
                reason: "must be at least 1".into(),
            });
        }
        store.page_sizes.insert(kind, size);
    }
    store
        .write_modes
        .extend(cfg.write_modes.iter().map(|(&kind, &mode)| (kind, mode)));

    Ok(store)
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_cover_every_kind() {
        let cfg = Config::default();
        assert_eq!(cfg.pages.len(), EntityKind::ALL.len());
        assert_eq!(cfg.pages[&EntityKind::Accommodations], 6);
        assert_eq!(cfg.write_modes[&EntityKind::Chefs], WriteMode::Replace);

        let store = to_store_config(&cfg).unwrap();
        assert_eq!(store.url.as_str(), "http://localhost:3001/");
        assert_eq!(store.write_timeout, Duration::from_secs(10));
        assert_eq!(store.poll_interval, Duration::from_secs(3));
        assert_eq!(store.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn file_values_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[store]
url = "http://catalog.test:8080"
insecure = true

[pages]
chefs = 9

[write_modes]
accommodations = "replace"
"#,
            )?;

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.store.url, "http://catalog.test:8080");
            assert_eq!(cfg.pages[&EntityKind::Chefs], 9);
            assert_eq!(cfg.pages[&EntityKind::Popular], 3);

            let store = to_store_config(&cfg).unwrap();
            assert_eq!(store.tls, TlsVerification::DangerAcceptInvalid);
            assert_eq!(store.items_per_page(EntityKind::Chefs), 9);
            assert_eq!(
                store.write_mode(EntityKind::Accommodations),
                WriteMode::Replace
            );
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[sync]\nwrite_timeout_secs = 4\n")?;
            jail.set_env("STAYLIST_SYNC__WRITE_TIMEOUT_SECS", "7");
            jail.set_env("STAYLIST_STORE__URL", "http://env.test");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.sync.write_timeout_secs, 7);
            assert_eq!(cfg.store.url, "http://env.test");
            Ok(())
        });
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut cfg = Config::default();
        cfg.favorites.poll_interval_secs = 0;
        assert!(matches!(
            to_store_config(&cfg),
            Err(ConfigError::Validation { ref field, .. }) if field == "favorites.poll_interval_secs"
        ));

        let mut cfg = Config::default();
        cfg.pages.insert(EntityKind::Popular, 0);
        assert!(to_store_config(&cfg).is_err());
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let mut cfg = Config::default();
        cfg.store.url = "not a url".into();
        assert!(matches!(
            to_store_config(&cfg),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");
            let mut cfg = Config::default();
            cfg.store.url = "http://saved.test".into();

            save_config_to(&cfg, &path).unwrap();
            assert_eq!(load_config_from(&path).unwrap(), cfg);
            Ok(())
        });
    }
}
