// src/lib.rs
//! Durable job store for schedulers.
//!
//! Jobs live in an embedded SQLite file as binary records keyed by id, and are
//! mirrored in a [`cache::JobCache`] the scheduler reads from. Removal goes
//! through [`delete::delete_job`] so a deleted job is never schedulable again.

pub mod cache;
pub mod codec;
pub mod config;
pub mod cron;
pub mod db;
pub mod delete;
pub mod job;
pub mod job_metadata;
pub mod job_store;
pub mod runner;
pub mod utils;

pub use cache::{JobCache, MemoryJobCache};
pub use config::StoreConfig;
pub use crate::cron::Schedule;
pub use db::{Database, StoreError};
pub use delete::delete_job;
pub use job::Job;
pub use job_metadata::JobMetadata;
pub use job_store::{JobStore, JobStoreError, MemoryJobStore, SqliteJobStore};
