// src/runner.rs
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::cache::MemoryJobCache;
use crate::job_store::JobStore;
use crate::utils::constants::MIN_PERSIST_INTERVAL;

/// Periodically save every cached job so run statistics survive a crash.
/// Runs until the handle is aborted or the store is closed. Intervals below
/// [`MIN_PERSIST_INTERVAL`] are raised to it.
pub fn start_persist_worker(
    cache: Arc<MemoryJobCache>,
    store: Arc<dyn JobStore>,
    every: Duration,
) -> JoinHandle<()> {
    if every < MIN_PERSIST_INTERVAL {
        warn!("Persist interval {:?} too short, using {:?}", every, MIN_PERSIST_INTERVAL);
    }
    let every = every.max(MIN_PERSIST_INTERVAL);
    info!("Persist worker started (every {:?})", every);

    tokio::spawn(async move {
        loop {
            sleep(every).await;

            let cache = cache.clone();
            let store = store.clone();
            let outcome = tokio::task::spawn_blocking(move || cache.persist(store.as_ref())).await;

            match outcome {
                Ok(Ok(saved)) => debug!("Persist worker saved {} jobs", saved),
                Ok(Err(e)) if e.is_closed() => {
                    info!("Job store closed, persist worker stopping");
                    break;
                }
                Ok(Err(e)) => error!("Persist worker failed: {}", e),
                Err(e) => error!("Persist worker task panicked: {}", e),
            }
        }
    })
}
