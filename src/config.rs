// src/config.rs
use std::env;
use std::path::{self, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::utils::constants::{
    DEFAULT_OPEN_TIMEOUT, DEFAULT_PERSIST_INTERVAL, DEFAULT_READ_POOL_SIZE, ENV_DIR,
    ENV_OPEN_TIMEOUT_SECS, ENV_PERSIST_INTERVAL_SECS, ENV_READ_POOL_SIZE, STORE_FILE_NAME,
};

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Directory holding the store file. Empty means the working directory.
    pub dir: PathBuf,
    /// How long `Database::open` waits on a store locked by another process.
    pub open_timeout: Duration,
    /// Idle read-only connections kept around between read transactions.
    pub read_pool_size: usize,
    /// Period of the cache persist worker.
    pub persist_interval: Duration,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            open_timeout: DEFAULT_OPEN_TIMEOUT,
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            persist_interval: DEFAULT_PERSIST_INTERVAL,
        }
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    pub fn with_read_pool_size(mut self, size: usize) -> Self {
        self.read_pool_size = size;
        self
    }

    pub fn with_persist_interval(mut self, interval: Duration) -> Self {
        self.persist_interval = interval;
        self
    }

    /// Build from `JOBDB_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(env::var(ENV_DIR).unwrap_or_default());

        if let Some(secs) = parse_env::<u64>(ENV_OPEN_TIMEOUT_SECS)? {
            config.open_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = parse_env::<usize>(ENV_READ_POOL_SIZE)? {
            config.read_pool_size = size;
        }
        if let Some(secs) = parse_env::<u64>(ENV_PERSIST_INTERVAL_SECS)? {
            config.persist_interval = Duration::from_secs(secs);
        }

        debug!("Loaded store config from environment: {:?}", config);
        Ok(config)
    }

    pub fn store_path(&self) -> PathBuf {
        store_file_path(&self.dir.to_string_lossy())
    }
}

/// `dir` with exactly one trailing separator, followed by the store file name.
pub fn store_file_path(dir: &str) -> PathBuf {
    if dir.is_empty() {
        return PathBuf::from(STORE_FILE_NAME);
    }
    let trimmed = dir.trim_end_matches(path::is_separator);
    PathBuf::from(format!("{trimmed}{}{STORE_FILE_NAME}", path::MAIN_SEPARATOR))
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        _ => Ok(None),
    }
}
