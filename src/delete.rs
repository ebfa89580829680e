// src/delete.rs
//! Removing a job from both the cache and the store.
//!
//! The two systems are not updated atomically. The steps run in a fixed
//! order, each regardless of how the previous one went:
//!
//! 1. disable the job, so any holder of the same object stops scheduling it;
//! 2. evict it from the cache, so no cache-miss path reloads it;
//! 3. delete the durable record.
//!
//! A crash between 2 and 3 leaves a disabled record in the store. Cache
//! warm-up skips disabled jobs, so it is never scheduled again. Every step is
//! a no-op for an id that is already gone.

use tracing::{info, warn};

use crate::cache::JobCache;
use crate::job::Job;
use crate::job_store::{JobStore, JobStoreError};

pub fn delete_job(job: &Job, cache: &dyn JobCache, store: &dyn JobStore) -> Result<(), JobStoreError> {
    job.disable();
    cache.delete(job.id());

    match store.delete(job.id()) {
        Ok(()) => {
            info!(job_id = %job.id(), "Job deleted");
            Ok(())
        }
        Err(e) => {
            warn!(job_id = %job.id(), "Job disabled and evicted but record not removed: {}", e);
            Err(e)
        }
    }
}
