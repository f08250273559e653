use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::store::StorePolicy;
use crate::transport::CurlOptions;

/// Host serving the order status feed when none is configured.
pub const DEFAULT_HOST: &str = "http://espa.cr.usgs.gov";

/// Checksum mismatches tolerated per scene before giving up.
pub const DEFAULT_CHECKSUM_RETRIES: u32 = 3;

/// Backoff for transient network failures (optional `[transfer_retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per GET (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/ebd/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbdConfig {
    /// Host serving `/ordering/status/<email>/rss/`. `http://` is assumed if no scheme.
    pub host: String,
    /// Re-downloads allowed after an md5 mismatch (total attempts = 1 + this).
    pub checksum_retries: u32,
    pub connect_timeout_secs: u64,
    /// Upper bound on a whole GET, including the body.
    pub transfer_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// If missing, network errors are not retried.
    #[serde(default)]
    pub transfer_retry: Option<RetryConfig>,
}

impl Default for EbdConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            checksum_retries: DEFAULT_CHECKSUM_RETRIES,
            connect_timeout_secs: 30,
            transfer_timeout_secs: 3600,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            transfer_retry: None,
        }
    }
}

impl EbdConfig {
    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.transfer_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.transfer_retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    pub fn store_policy(&self) -> StorePolicy {
        StorePolicy {
            checksum_retries: self.checksum_retries,
            transfer_retry: self.retry_policy(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ebd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<EbdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = EbdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<EbdConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: EbdConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
