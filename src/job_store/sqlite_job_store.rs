// src/job_store/sqlite_job_store.rs
use std::sync::Arc;

use tracing::{debug, info};

use super::{decode_record, encode_record, recompute_timing, JobStore, JobStoreError};
use crate::config::StoreConfig;
use crate::db::Database;
use crate::job::Job;
use crate::utils::constants::JOB_COLLECTION;

/// [`JobStore`] over the embedded SQLite database, one record per job in
/// the `jobs` collection.
pub struct SqliteJobStore {
    db: Arc<Database>,
}

impl SqliteJobStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn open(config: &StoreConfig) -> Result<Self, JobStoreError> {
        Ok(Self::new(Arc::new(Database::open(config)?)))
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

impl JobStore for SqliteJobStore {
    fn get_all(&self) -> Result<Vec<Job>, JobStoreError> {
        let jobs = self.db.update::<_, JobStoreError, _>(|tx| {
            let collection = tx.create_collection_if_not_exists(JOB_COLLECTION)?;

            let mut jobs = Vec::new();
            collection.for_each(|key, value| {
                let mut job = decode_record(key, value)?;
                recompute_timing(&mut job)?;
                jobs.push(job);
                Ok::<_, JobStoreError>(())
            })?;
            Ok(jobs)
        })?;

        debug!("Loaded {} jobs from {:?}", jobs.len(), self.db.path());
        Ok(jobs)
    }

    fn get(&self, id: &str) -> Result<Job, JobStoreError> {
        self.db.view::<_, JobStoreError, _>(|tx| {
            let value = match tx.collection(JOB_COLLECTION)? {
                Some(collection) => collection.get(id)?,
                None => None,
            };
            let value = value.ok_or_else(|| JobStoreError::NotFound { id: id.to_string() })?;
            decode_record(id, &value)
        })
    }

    fn save(&self, job: &Job) -> Result<(), JobStoreError> {
        let record = encode_record(job)?;

        self.db.update::<_, JobStoreError, _>(|tx| {
            tx.create_collection_if_not_exists(JOB_COLLECTION)?
                .put(job.id(), &record)?;
            Ok(())
        })?;

        debug!(job_id = %job.id(), bytes = record.len(), "Saved job");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), JobStoreError> {
        let removed = self.db.update::<_, JobStoreError, _>(|tx| {
            Ok(tx.create_collection_if_not_exists(JOB_COLLECTION)?.delete(id)?)
        })?;

        if removed {
            info!(job_id = %id, "Deleted job record");
        } else {
            debug!(job_id = %id, "No job record to delete");
        }
        Ok(())
    }

    fn close(&self) -> Result<(), JobStoreError> {
        Ok(self.db.close()?)
    }
}
