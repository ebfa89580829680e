// src/cron/schedule.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cron_parser::CronParser;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },
    #[error("cron expression '{expression}' has no occurrence after {after}")]
    Exhausted {
        expression: String,
        after: DateTime<Utc>,
    },
}

/// Recurrence rule plus an optional anchor before which the job never fires.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub expression: String,
    pub starts_at: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            starts_at: None,
        }
    }

    pub fn starting_at(mut self, starts_at: DateTime<Utc>) -> Self {
        self.starts_at = Some(starts_at);
        self
    }

    /// First occurrence strictly after `max(now, starts_at)`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        let from = match self.starts_at {
            Some(anchor) if anchor > now => anchor,
            _ => now,
        };
        CronParser::next_execution(&self.expression, from)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        CronParser::validate(&self.expression)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.starts_at {
            Some(anchor) => write!(f, "{} (from {})", self.expression, anchor.to_rfc3339()),
            None => f.write_str(&self.expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn anchor_in_future_delays_first_run() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let anchor = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 30).unwrap();
        let schedule = Schedule::new("0 0 * * * *").starting_at(anchor);

        let next = schedule.next_run_after(now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap());
    }

    #[test]
    fn anchor_in_past_is_ignored() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let anchor = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let schedule = Schedule::new("0 0 * * * *").starting_at(anchor);

        let next = schedule.next_run_after(now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap());
    }

    #[test]
    fn display_includes_anchor() {
        let anchor = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let schedule = Schedule::new("0 0 * * * *").starting_at(anchor);
        assert_eq!(schedule.to_string(), "0 0 * * * * (from 2024-06-01T00:00:00+00:00)");
    }
}
