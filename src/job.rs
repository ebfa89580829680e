// src/job.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::JobCache;
use crate::cron::{Schedule, ScheduleError};
use crate::job_metadata::JobMetadata;
use crate::job_store::{JobStore, JobStoreError};

/// A persisted, schedulable unit of work.
///
/// `disabled` is an atomic so that every holder of the same `Arc<Job>` (the
/// cache, a worker mid-decision) sees a disable the moment it happens.
#[derive(Serialize, Deserialize, Debug)]
pub struct Job {
    id: String,
    pub name: String,
    pub command: String,
    pub owner: String,
    pub schedule: Schedule,
    pub created_at: DateTime<Utc>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub metadata: JobMetadata,
    disabled: AtomicBool,

    // Relative to the moment it was computed, so never persisted.
    #[serde(skip)]
    delay: Duration,
}

impl Job {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        owner: impl Into<String>,
        schedule: Schedule,
    ) -> Self {
        Self {
            id: nanoid!(10),
            name: name.into(),
            command: command.into(),
            owner: owner.into(),
            schedule,
            created_at: Utc::now(),
            next_run_at: None,
            metadata: JobMetadata::default(),
            disabled: AtomicBool::new(false),
            delay: Duration::ZERO,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The store key is authoritative for the id of a loaded record.
    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Release);
    }

    /// Only takes effect durably once the job is saved again.
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Release);
    }

    /// Time left until `next_run_at`, as of the last `init_delay_duration`.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Recompute `next_run_at` and the delay from the schedule.
    pub fn init_delay_duration(&mut self, now: DateTime<Utc>) -> Result<(), ScheduleError> {
        let next = self.schedule.next_run_after(now)?;
        self.delay = (next - now).to_std().unwrap_or(Duration::ZERO);
        self.next_run_at = Some(next);
        debug!(job_id = %self.id, next_run_at = %next, "Computed next run");
        Ok(())
    }

    pub fn save(&self, store: &dyn JobStore) -> Result<(), JobStoreError> {
        store.save(self)
    }

    /// See [`crate::delete::delete_job`].
    pub fn delete(&self, cache: &dyn JobCache, store: &dyn JobStore) -> Result<(), JobStoreError> {
        crate::delete::delete_job(self, cache, store)
    }
}

impl Clone for Job {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            command: self.command.clone(),
            owner: self.owner.clone(),
            schedule: self.schedule.clone(),
            created_at: self.created_at,
            next_run_at: self.next_run_at,
            metadata: self.metadata.clone(),
            disabled: AtomicBool::new(self.is_disabled()),
            delay: self.delay,
        }
    }
}
