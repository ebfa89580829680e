// src/job_metadata.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Run statistics mutated by the executor after every run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct JobMetadata {
    pub success_count: u64,
    pub error_count: u64,
    pub number_of_finished_runs: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<DateTime<Utc>>,
    pub last_attempted_run: Option<DateTime<Utc>>,
}

impl JobMetadata {
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.success_count += 1;
        self.number_of_finished_runs += 1;
        self.last_success = Some(at);
        self.last_attempted_run = Some(at);
    }

    pub fn record_failure(&mut self, at: DateTime<Utc>) {
        self.error_count += 1;
        self.number_of_finished_runs += 1;
        self.last_error = Some(at);
        self.last_attempted_run = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_grow() {
        let mut meta = JobMetadata::default();
        let t1 = Utc::now();
        meta.record_success(t1);
        meta.record_failure(t1);
        meta.record_success(t1);

        assert_eq!(meta.success_count, 2);
        assert_eq!(meta.error_count, 1);
        assert_eq!(meta.number_of_finished_runs, 3);
        assert_eq!(meta.last_attempted_run, Some(t1));
    }
}
