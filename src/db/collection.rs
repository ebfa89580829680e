// src/db/collection.rs
use rusqlite::{params, Connection, OptionalExtension};

use super::error::StoreError;

/// A named key/value namespace inside a transaction. Backed by one
/// `WITHOUT ROWID` table, so iteration follows key order.
pub struct Collection<'tx> {
    conn: &'tx Connection,
    name: String,
    writable: bool,
}

impl<'tx> Collection<'tx> {
    /// Read-only handle on an existing collection.
    pub(crate) fn open(conn: &'tx Connection, name: &str) -> Result<Option<Self>, StoreError> {
        validate_name(name)?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        Ok(exists.then(|| Self {
            conn,
            name: name.to_string(),
            writable: false,
        }))
    }

    pub(crate) fn create_if_not_exists(conn: &'tx Connection, name: &str) -> Result<Self, StoreError> {
        validate_name(name)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{name}\" (
                key   TEXT PRIMARY KEY NOT NULL,
                value BLOB NOT NULL
            ) WITHOUT ROWID;"
        ))?;
        Ok(Self {
            conn,
            name: name.to_string(),
            writable: true,
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .conn
            .query_row(
                &format!("SELECT value FROM \"{}\" WHERE key = ?1", self.name),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Visit every pair in key order. The first error stops the walk.
    pub fn for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        E: From<StoreError>,
        F: FnMut(&str, &[u8]) -> Result<(), E>,
    {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT key, value FROM \"{}\" ORDER BY key", self.name))
            .map_err(StoreError::from)?;
        let mut rows = stmt.query([]).map_err(StoreError::from)?;

        while let Some(row) = rows.next().map_err(StoreError::from)? {
            let key: String = row.get(0).map_err(StoreError::from)?;
            let value: Vec<u8> = row.get(1).map_err(StoreError::from)?;
            f(&key, &value)?;
        }
        Ok(())
    }

    /// Insert or overwrite.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                self.name
            ),
            params![key, value],
        )?;
        Ok(())
    }

    /// Returns whether a pair was removed. Absent keys are not an error.
    pub fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.ensure_writable()?;
        let removed = self
            .conn
            .execute(&format!("DELETE FROM \"{}\" WHERE key = ?1", self.name), params![key])?;
        Ok(removed > 0)
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.writable {
            Ok(())
        } else {
            Err(StoreError::ReadOnly(self.name.clone()))
        }
    }
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.to_ascii_lowercase().starts_with("sqlite_");

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}
