use crate::errors::LogError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory the filtering daemon writes its per-day query logs into.
    pub log_dir: PathBuf,

    #[serde(default = "default_tail_poll_interval_ms")]
    pub tail_poll_interval_ms: u64,

    #[serde(default = "default_tail_backfill_count")]
    pub tail_backfill_count: usize,

    #[serde(default = "default_resolver_cache_ttl_secs")]
    pub resolver_cache_ttl_secs: u64,
}

fn default_tail_poll_interval_ms() -> u64 {
    500
}

fn default_tail_backfill_count() -> usize {
    50
}

fn default_resolver_cache_ttl_secs() -> u64 {
    3600
}

impl Config {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            tail_poll_interval_ms: default_tail_poll_interval_ms(),
            tail_backfill_count: default_tail_backfill_count(),
            resolver_cache_ttl_secs: default_resolver_cache_ttl_secs(),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, LogError> {
        toml::from_str(raw).map_err(|e| LogError::InvalidConfig(e.to_string()))
    }
}
