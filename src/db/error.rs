// src/db/error.rs
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store at {path:?} is unavailable: {reason}")]
    Unavailable { path: PathBuf, reason: String },
    #[error("store is closed")]
    Closed,
    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),
    #[error("cannot write to collection '{0}' inside a read transaction")]
    ReadOnly(String),
    #[error("storage engine error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::Unavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
