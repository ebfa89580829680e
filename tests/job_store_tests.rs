use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use jobdb::{Job, JobStore, JobStoreError, Schedule, SqliteJobStore, StoreConfig, StoreError};

fn config(dir: &Path) -> StoreConfig {
    StoreConfig::new(dir).with_open_timeout(Duration::from_millis(250))
}

fn open(dir: &Path) -> SqliteJobStore {
    SqliteJobStore::open(&config(dir)).expect("open store")
}

fn mock_job_with_generic_schedule() -> Job {
    let mut job = Job::new(
        "mock_job",
        "bash -c 'date'",
        "example@example.com",
        Schedule::new("0 */10 * * * *"),
    );
    job.init_delay_duration(Utc::now()).unwrap();
    job
}

#[test]
fn save_and_get_job() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());

    let mut job = mock_job_with_generic_schedule();
    job.metadata.record_success(Utc::now());
    job.save(&store).unwrap();

    let loaded = store.get(job.id()).unwrap();
    assert_eq!(loaded.id(), job.id());
    assert_eq!(loaded.name, job.name);
    assert_eq!(loaded.command, job.command);
    assert_eq!(loaded.schedule, job.schedule);
    assert_eq!(loaded.owner, job.owner);
    assert_eq!(loaded.metadata.success_count, 1);
    assert_eq!(loaded.metadata, job.metadata);
    assert_eq!(loaded.next_run_at, job.next_run_at);
}

#[test]
fn save_is_an_upsert() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());

    let mut job = mock_job_with_generic_schedule();
    store.save(&job).unwrap();
    job.metadata.record_failure(Utc::now());
    job.command = "bash -c 'uptime'".to_string();
    store.save(&job).unwrap();

    let all = store.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].command, "bash -c 'uptime'");
    assert_eq!(all[0].metadata.error_count, 1);
}

#[test]
fn fresh_store_has_no_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());

    assert!(store.get_all().unwrap().is_empty());
    // Enumerating created the collection; doing it again is still fine.
    assert!(store.get_all().unwrap().is_empty());
}

#[test]
fn get_all_recomputes_timing_from_now() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());

    let saved = mock_job_with_generic_schedule();
    store.save(&saved).unwrap();

    let before = Utc::now();
    let jobs = store.get_all().unwrap();
    let after = Utc::now();

    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert_eq!(job.id(), saved.id());

    let next = job.next_run_at.expect("next run computed");
    assert!(next >= saved.schedule.next_run_after(before).unwrap());
    assert!(next <= saved.schedule.next_run_after(after).unwrap());

    let longest = (next - before).to_std().unwrap();
    let shortest = (next - after).to_std().unwrap_or_default();
    assert!(job.delay() <= longest);
    assert!(job.delay() >= shortest);
    assert!(longest - shortest <= Duration::from_millis(50));
}

#[test]
fn get_all_returns_jobs_in_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());

    let mut ids: Vec<String> = (0..5)
        .map(|_| {
            let job = mock_job_with_generic_schedule();
            store.save(&job).unwrap();
            job.id().to_string()
        })
        .collect();
    ids.sort();

    let listed: Vec<String> = store.get_all().unwrap().iter().map(|j| j.id().to_string()).collect();
    assert_eq!(listed, ids);
}

#[test]
fn get_missing_job_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    store.save(&mock_job_with_generic_schedule()).unwrap();

    match store.get("does-not-exist") {
        Err(JobStoreError::NotFound { id }) => assert_eq!(id, "does-not-exist"),
        other => panic!("expected NotFound, got {:?}", other.map(|j| j.id().to_string())),
    }
}

#[test]
fn jobs_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let job = mock_job_with_generic_schedule();
    job.disable();

    let store = open(dir.path());
    store.save(&job).unwrap();
    store.close().unwrap();

    let reopened = open(dir.path());
    let loaded = reopened.get(job.id()).unwrap();
    assert_eq!(loaded.name, job.name);
    assert!(loaded.is_disabled());
}

#[test]
fn second_store_on_same_dir_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let _held = open(dir.path());

    let err = SqliteJobStore::open(&config(dir.path()).with_open_timeout(Duration::from_millis(100)))
        .err()
        .expect("second open must fail");
    assert!(matches!(err, JobStoreError::Store(StoreError::Unavailable { .. })));
}

#[test]
fn closed_store_fails_every_operation() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    let job = mock_job_with_generic_schedule();
    store.save(&job).unwrap();
    store.close().unwrap();

    assert!(store.get(job.id()).unwrap_err().is_closed());
    assert!(store.get_all().unwrap_err().is_closed());
    assert!(store.save(&job).unwrap_err().is_closed());
    assert!(store.delete(job.id()).unwrap_err().is_closed());
    store.close().unwrap();
}

#[test]
fn isolated_stores_run_side_by_side() {
    let a_dir = tempfile::tempdir().unwrap();
    let b_dir = tempfile::tempdir().unwrap();
    let a = open(a_dir.path());
    let b = open(b_dir.path());

    let job = mock_job_with_generic_schedule();
    a.save(&job).unwrap();

    assert!(a.get(job.id()).is_ok());
    assert!(b.get(job.id()).unwrap_err().is_not_found());
}

#[test]
fn concurrent_reads_during_unrelated_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open(dir.path()));

    let first = mock_job_with_generic_schedule();
    let second = mock_job_with_generic_schedule();
    store.save(&first).unwrap();
    store.save(&second).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..50 {
                let mut job = mock_job_with_generic_schedule();
                job.name = format!("writer-{i}");
                store.save(&job).unwrap();
            }
        });

        for expected in [&first, &second, &first] {
            let store = store.clone();
            s.spawn(move || {
                for _ in 0..100 {
                    let loaded = store.get(expected.id()).unwrap();
                    assert_eq!(loaded.name, expected.name);
                    assert_eq!(loaded.command, expected.command);
                    assert_eq!(loaded.schedule, expected.schedule);
                    assert_eq!(loaded.metadata, expected.metadata);
                }
            });
        }
    });

    assert_eq!(store.get_all().unwrap().len(), 52);
}
