//! Merges the static YAML config (no secrets) with environment secrets into
//! a ready-to-run [`SyncConfig`].
//!
//! Required environment variables: `LMS_USERNAME`, `LMS_PASSWORD`,
//! `STORAGE_ACCESS_TOKEN`.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::{ConcurrencyConfig, Credentials, SyncConfig};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct StaticConfig {
    source: SourceSection,
    sync: SyncSection,
    #[serde(default)]
    concurrency: ConcurrencySection,
    #[serde(default = "default_http_timeout")]
    http_timeout_secs: u64,
}

#[derive(Deserialize)]
struct SourceSection {
    base_url: String,
}

#[derive(Deserialize)]
struct SyncSection {
    root: String,
}

#[derive(Deserialize, Default)]
struct ConcurrencySection {
    sections: Option<usize>,
    resources: Option<usize>,
    transfers: Option<usize>,
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) => Ok(value),
        Err(e) => {
            error!(error = ?e, var = name, "Required environment variable not set");
            Err(anyhow::anyhow!("{name} environment variable not set: {e}"))
        }
    }
}

/// Loads a static YAML config file (no secrets) and injects required env vars
/// for secrets. Returns a fully merged [`SyncConfig`] or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => conf,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let username = require_env("LMS_USERNAME")?;
    let password = require_env("LMS_PASSWORD")?;
    let access_token = require_env("STORAGE_ACCESS_TOKEN")?;

    let defaults = ConcurrencyConfig::default();
    let concurrency = ConcurrencyConfig {
        sections: static_conf.concurrency.sections.unwrap_or(defaults.sections),
        resources: static_conf
            .concurrency
            .resources
            .unwrap_or(defaults.resources),
        transfers: static_conf
            .concurrency
            .transfers
            .unwrap_or(defaults.transfers),
    };
    if concurrency.sections == 0 || concurrency.resources == 0 || concurrency.transfers == 0 {
        anyhow::bail!("concurrency caps must be positive");
    }

    let config = SyncConfig {
        base_url: static_conf.source.base_url.trim_end_matches('/').to_string(),
        credentials: Credentials { username, password },
        sync_root: static_conf.sync.root,
        access_token,
        concurrency,
        http_timeout_secs: static_conf.http_timeout_secs,
    };

    info!(
        base_url = %config.base_url,
        sync_root = %config.sync_root,
        sections = config.concurrency.sections,
        resources = config.concurrency.resources,
        transfers = config.concurrency.transfers,
        "Config loaded and merged successfully"
    );

    Ok(config)
}
