// src/job_store/mod.rs
//! Durable persistence contract for [`Job`] records.

mod memory_job_store;
mod sqlite_job_store;

pub use memory_job_store::MemoryJobStore;
pub use sqlite_job_store::SqliteJobStore;

use crate::codec::CodecError;
use crate::cron::ScheduleError;
use crate::db::StoreError;
use crate::job::Job;

/// Every operation is one store transaction.
pub trait JobStore: Send + Sync {
    /// All jobs in key order with freshly computed timing state. The first
    /// record that fails to decode or to reschedule aborts the whole call.
    fn get_all(&self) -> Result<Vec<Job>, JobStoreError>;

    /// One job, exactly as stored. Timing state is not recomputed.
    fn get(&self, id: &str) -> Result<Job, JobStoreError>;

    /// Insert or overwrite the record keyed by `job.id()`.
    fn save(&self, job: &Job) -> Result<(), JobStoreError>;

    /// Remove the record if present. Absent ids are not an error.
    fn delete(&self, id: &str) -> Result<(), JobStoreError>;

    /// Release the backing store. Later calls fail with `StoreError::Closed`.
    fn close(&self) -> Result<(), JobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("job with id {id} not found")]
    NotFound { id: String },
    #[error("stored record for job {key} is unreadable: {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },
    #[error("job {id} could not be encoded: {source}")]
    Encode {
        id: String,
        #[source]
        source: CodecError,
    },
    #[error("could not compute next run for job {id}: {source}")]
    TimingRecompute {
        id: String,
        #[source]
        source: ScheduleError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl JobStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, JobStoreError::NotFound { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, JobStoreError::Store(StoreError::Closed))
    }
}

/// Decode a stored value, trusting the key over the encoded id.
pub(crate) fn decode_record(key: &str, value: &[u8]) -> Result<Job, JobStoreError> {
    let mut job = crate::codec::decode(value).map_err(|source| JobStoreError::Decode {
        key: key.to_string(),
        source,
    })?;
    job.set_id(key);
    Ok(job)
}

pub(crate) fn encode_record(job: &Job) -> Result<Vec<u8>, JobStoreError> {
    crate::codec::encode(job).map_err(|source| JobStoreError::Encode {
        id: job.id().to_string(),
        source,
    })
}

pub(crate) fn recompute_timing(job: &mut Job) -> Result<(), JobStoreError> {
    job.init_delay_duration(chrono::Utc::now())
        .map_err(|source| JobStoreError::TimingRecompute {
            id: job.id().to_string(),
            source,
        })
}
