use anyhow::Context;
use querylens_domain::Config;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Where the filtering daemon writes query logs unless told otherwise.
const DEFAULT_LOG_DIR: &str = "/var/log/blocky";

pub fn load_config(path: Option<&str>, log_dir: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            Config::from_toml_str(&raw)?
        }
        None => Config::new(DEFAULT_LOG_DIR),
    };
    if let Some(dir) = log_dir {
        config.log_dir = dir;
    }
    Ok(config)
}

/// `--log-level` wins over `RUST_LOG`; without either, info.
pub fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
