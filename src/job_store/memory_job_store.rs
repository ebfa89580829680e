// src/job_store/memory_job_store.rs
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::{decode_record, encode_record, recompute_timing, JobStore, JobStoreError};
use crate::db::StoreError;
use crate::job::Job;

/// In-process [`JobStore`]. Records are kept encoded, so decode and
/// rescheduling behave exactly as they do against the database.
pub struct MemoryJobStore {
    records: RwLock<Option<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Some(BTreeMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore for MemoryJobStore {
    fn get_all(&self) -> Result<Vec<Job>, JobStoreError> {
        let guard = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let records = guard.as_ref().ok_or(StoreError::Closed)?;

        records
            .iter()
            .map(|(key, value)| {
                let mut job = decode_record(key, value)?;
                recompute_timing(&mut job)?;
                Ok::<_, JobStoreError>(job)
            })
            .collect()
    }

    fn get(&self, id: &str) -> Result<Job, JobStoreError> {
        let guard = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let records = guard.as_ref().ok_or(StoreError::Closed)?;

        let value = records
            .get(id)
            .ok_or_else(|| JobStoreError::NotFound { id: id.to_string() })?;
        decode_record(id, value)
    }

    fn save(&self, job: &Job) -> Result<(), JobStoreError> {
        let record = encode_record(job)?;
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let records = guard.as_mut().ok_or(StoreError::Closed)?;
        records.insert(job.id().to_string(), record);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), JobStoreError> {
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let records = guard.as_mut().ok_or(StoreError::Closed)?;
        records.remove(id);
        Ok(())
    }

    fn close(&self) -> Result<(), JobStoreError> {
        self.records.write().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}
