// src/cache.rs
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::job::Job;
use crate::job_store::{JobStore, JobStoreError};

/// In-memory index of the jobs the scheduler is currently tracking.
/// Implementations must be safe to call from any thread.
pub trait JobCache: Send + Sync {
    fn get(&self, id: &str) -> Option<Arc<Job>>;
    fn set(&self, job: Arc<Job>);
    /// Evicting an id that is not cached is a no-op.
    fn delete(&self, id: &str);
}

#[derive(Default)]
pub struct MemoryJobCache {
    jobs: RwLock<HashMap<String, Arc<Job>>>,
}

impl MemoryJobCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_all(&self) -> Vec<Arc<Job>> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill the cache from the store. Disabled jobs stay out: a disabled
    /// record may be the remains of an interrupted delete.
    pub fn warm_up(&self, store: &dyn JobStore) -> Result<usize, JobStoreError> {
        let mut cached = 0;
        let mut skipped = 0;
        for job in store.get_all()? {
            if job.is_disabled() {
                skipped += 1;
                continue;
            }
            self.set(Arc::new(job));
            cached += 1;
        }

        info!("Cache warm-up: {} jobs cached, {} disabled skipped", cached, skipped);
        Ok(cached)
    }

    /// Save every cached, enabled job. Stops at the first failure.
    ///
    /// The read lock is held for the whole pass, so an eviction waits for it
    /// to finish and the store delete that follows removes anything saved here.
    pub fn persist(&self, store: &dyn JobStore) -> Result<usize, JobStoreError> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        let mut saved = 0;
        for job in jobs.values() {
            if job.is_disabled() {
                continue;
            }
            store.save(job)?;
            saved += 1;
        }

        debug!("Persisted {} cached jobs", saved);
        Ok(saved)
    }
}

impl JobCache for MemoryJobCache {
    fn get(&self, id: &str) -> Option<Arc<Job>> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn set(&self, job: Arc<Job>) {
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job.id().to_string(), job);
    }

    fn delete(&self, id: &str) {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner).remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cron::Schedule;
    use crate::delete::delete_job;
    use crate::job_store::MemoryJobStore;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    fn job(name: &str) -> Job {
        Job::new(name, "true", "tests", Schedule::new("0 0 * * * *"))
    }

    #[test]
    fn set_get_delete() {
        let cache = MemoryJobCache::new();
        let j = Arc::new(job("a"));
        cache.set(j.clone());

        assert!(Arc::ptr_eq(&cache.get(j.id()).unwrap(), &j));
        cache.delete(j.id());
        cache.delete(j.id());
        assert!(cache.get(j.id()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn warm_up_skips_disabled_jobs() {
        let store = MemoryJobStore::new();
        let live = job("live");
        let dead = job("dead");
        dead.disable();
        store.save(&live).unwrap();
        store.save(&dead).unwrap();

        let cache = MemoryJobCache::new();
        assert_eq!(cache.warm_up(&store).unwrap(), 1);
        assert!(cache.contains(live.id()));
        assert!(!cache.contains(dead.id()));

        let warmed = cache.get(live.id()).unwrap();
        assert!(warmed.next_run_at.is_some());
    }

    #[test]
    fn warm_up_propagates_store_errors() {
        let store = MemoryJobStore::new();
        store.close().unwrap();
        assert!(MemoryJobCache::new().warm_up(&store).is_err());
    }

    #[test]
    fn persist_saves_every_cached_job() {
        let store = MemoryJobStore::new();
        let cache = MemoryJobCache::new();
        for name in ["a", "b", "c"] {
            cache.set(Arc::new(job(name)));
        }

        assert_eq!(cache.persist(&store).unwrap(), 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn persist_skips_disabled_jobs() {
        let store = MemoryJobStore::new();
        let cache = MemoryJobCache::new();
        let dead = Arc::new(job("dead"));
        dead.disable();
        cache.set(dead);
        cache.set(Arc::new(job("live")));

        assert_eq!(cache.persist(&store).unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    /// Starts a full delete of the job on another thread while a save is
    /// in progress.
    struct DeleteDuringSave {
        inner: Arc<MemoryJobStore>,
        cache: Arc<MemoryJobCache>,
        deleter: Mutex<Option<thread::JoinHandle<Result<(), JobStoreError>>>>,
    }

    impl JobStore for DeleteDuringSave {
        fn get_all(&self) -> Result<Vec<Job>, JobStoreError> {
            self.inner.get_all()
        }

        fn get(&self, id: &str) -> Result<Job, JobStoreError> {
            self.inner.get(id)
        }

        fn save(&self, job: &Job) -> Result<(), JobStoreError> {
            let victim = job.clone();
            let cache = self.cache.clone();
            let store = self.inner.clone();
            let handle = thread::spawn(move || {
                let evicted = cache.get(victim.id()).expect("job cached");
                delete_job(&evicted, cache.as_ref(), store.as_ref())
            });
            *self.deleter.lock().unwrap() = Some(handle);

            // Give the deleter a chance to run ahead of the save.
            thread::sleep(Duration::from_millis(50));
            self.inner.save(job)
        }

        fn delete(&self, id: &str) -> Result<(), JobStoreError> {
            self.inner.delete(id)
        }

        fn close(&self) -> Result<(), JobStoreError> {
            self.inner.close()
        }
    }

    #[test]
    fn delete_racing_persist_stays_deleted() {
        let inner = Arc::new(MemoryJobStore::new());
        let cache = Arc::new(MemoryJobCache::new());
        cache.set(Arc::new(job("doomed")));

        let store = DeleteDuringSave {
            inner: inner.clone(),
            cache: cache.clone(),
            deleter: Mutex::new(None),
        };
        cache.persist(&store).unwrap();

        let deleter = store.deleter.lock().unwrap().take().unwrap();
        deleter.join().unwrap().unwrap();

        assert!(cache.is_empty());
        assert!(inner.get_all().unwrap().is_empty());
    }
}
