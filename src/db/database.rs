// src/db/database.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

use super::collection::Collection;
use super::error::StoreError;
use super::lock::StoreLock;
use super::pool::ReaderPool;
use crate::config::StoreConfig;

/// Handle on the embedded store file.
///
/// Read transactions run on pooled read-only connections and see a snapshot;
/// read-write transactions go through the single writer connection, one at a
/// time. The handle is shared by reference; `close` makes every later
/// transaction fail with [`StoreError::Closed`].
pub struct Database {
    path: PathBuf,
    state: RwLock<Option<Handles>>,
}

struct Handles {
    writer: Mutex<Connection>,
    readers: ReaderPool,
    _lock: StoreLock,
}

pub struct ReadTx<'conn> {
    tx: Transaction<'conn>,
}

pub struct WriteTx<'conn> {
    tx: Transaction<'conn>,
}

impl Database {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = config.store_path();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(&path, e))?;
        }

        let lock = StoreLock::acquire(&path, config.open_timeout)?;

        let writer = Connection::open(&path).map_err(|e| StoreError::unavailable(&path, e))?;
        writer.busy_timeout(config.open_timeout)?;
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "synchronous", "FULL")?;

        info!("Opened job store at {:?}", path);

        Ok(Self {
            state: RwLock::new(Some(Handles {
                writer: Mutex::new(writer),
                readers: ReaderPool::new(&path, config.open_timeout, config.read_pool_size),
                _lock: lock,
            })),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }

    /// Run `f` inside a read transaction.
    pub fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&ReadTx<'_>) -> Result<T, E>,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let handles = state.as_ref().ok_or(StoreError::Closed)?;

        let mut conn = handles.readers.get()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(StoreError::from)?;
        let read = ReadTx { tx };

        let value = f(&read)?;
        read.tx.rollback().map_err(StoreError::from)?;
        Ok(value)
    }

    /// Run `f` inside a read-write transaction. Commits when `f` returns
    /// `Ok`, rolls every write back when it returns `Err`.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&WriteTx<'_>) -> Result<T, E>,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let handles = state.as_ref().ok_or(StoreError::Closed)?;

        let mut writer = handles.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = writer
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let write = WriteTx { tx };

        match f(&write) {
            Ok(value) => {
                write.tx.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = write.tx.rollback() {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Release the store file. Closing an already closed store is a no-op.
    pub fn close(&self) -> Result<(), StoreError> {
        let handles = self.state.write().unwrap_or_else(PoisonError::into_inner).take();
        let Some(Handles {
            writer,
            readers,
            _lock,
        }) = handles
        else {
            debug!("Job store at {:?} already closed", self.path);
            return Ok(());
        };

        drop(readers);
        let conn = writer.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| StoreError::from(e))?;

        info!("Closed job store at {:?}", self.path);
        Ok(())
    }
}

impl ReadTx<'_> {
    /// `None` when the collection has never been created.
    pub fn collection(&self, name: &str) -> Result<Option<Collection<'_>>, StoreError> {
        Collection::open(&self.tx, name)
    }
}

impl WriteTx<'_> {
    /// Idempotent: succeeds whether or not the collection already exists.
    pub fn create_collection_if_not_exists(&self, name: &str) -> Result<Collection<'_>, StoreError> {
        Collection::create_if_not_exists(&self.tx, name)
    }
}
