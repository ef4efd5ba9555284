//! CLI configuration: the shared config crate plus flag overrides.
//!
//! File + environment layering lives in `staylist-config`; this module
//! resolves `--config` and applies `--url`, `--insecure`, `--timeout` and
//! `--write-timeout` on top.

use std::path::PathBuf;
use std::time::Duration;

pub use staylist_config::{Config, config_path, load_config_from, save_config_to, to_store_config};
use staylist_core::{StoreConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file selected by `--config` / `STAYLIST_CONFIG`, else the
/// platform default.
pub fn resolve_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the effective config. A missing file yields defaults.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&resolve_path(global))?)
}

/// Build the `StoreConfig` for a run: file, environment, then flags.
pub fn build_store_config(global: &GlobalOpts) -> Result<StoreConfig, CliError> {
    let cfg = load(global)?;
    let mut store = to_store_config(&cfg)?;

    if let Some(ref raw) = global.url {
        store.url = parse_url("url", raw)?;
    }
    if global.insecure {
        store.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        store.timeout = positive_secs("timeout", secs)?;
    }
    if let Some(secs) = global.write_timeout {
        store.write_timeout = positive_secs("write-timeout", secs)?;
    }

    Ok(store)
}

pub fn parse_url(field: &str, raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

pub fn positive_secs(field: &str, secs: u64) -> Result<Duration, CliError> {
    if secs == 0 {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}
