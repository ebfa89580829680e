// src/utils/constants.rs
use std::time::Duration;

pub const STORE_FILE_NAME: &str = "jobdb.db";
pub const LOCK_FILE_SUFFIX: &str = ".lock";

/// Upper bound on an encoded job record, marker excluded.
pub const MAX_RECORD_BYTES: usize = 1024 * 1024;

/// Collection holding every job record.
pub const JOB_COLLECTION: &str = "jobs";

pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_PERSIST_INTERVAL: Duration = Duration::from_secs(5);
pub const MIN_PERSIST_INTERVAL: Duration = Duration::from_millis(10);

pub const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

pub const ENV_DIR: &str = "JOBDB_DIR";
pub const ENV_OPEN_TIMEOUT_SECS: &str = "JOBDB_OPEN_TIMEOUT_SECS";
pub const ENV_READ_POOL_SIZE: &str = "JOBDB_READ_POOL_SIZE";
pub const ENV_PERSIST_INTERVAL_SECS: &str = "JOBDB_PERSIST_INTERVAL_SECS";
