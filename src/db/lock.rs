// src/db/lock.rs
use std::fs::{File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::error::StoreError;
use crate::utils::constants::{LOCK_FILE_SUFFIX, LOCK_RETRY_INTERVAL};

/// Exclusive, process-level claim on a store file, held through an advisory
/// lock on `<store file>.lock`. Released when dropped.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    _file: File,
}

impl StoreLock {
    /// Poll for the lock until `timeout` elapses.
    pub fn acquire(store_path: &Path, timeout: Duration) -> Result<Self, StoreError> {
        let mut lock_path = store_path.as_os_str().to_owned();
        lock_path.push(LOCK_FILE_SUFFIX);
        let path = PathBuf::from(lock_path);

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::unavailable(store_path, e))?;

        let started = Instant::now();
        loop {
            match file.try_lock() {
                Ok(()) => {
                    debug!("Acquired store lock {:?}", path);
                    return Ok(Self { path, _file: file });
                }
                Err(TryLockError::WouldBlock) => {
                    if started.elapsed() >= timeout {
                        warn!("Store lock {:?} still held after {:?}", path, timeout);
                        return Err(StoreError::unavailable(
                            store_path,
                            format!("locked by another process (waited {timeout:?})"),
                        ));
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(TryLockError::Error(e)) => return Err(StoreError::unavailable(store_path, e)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
