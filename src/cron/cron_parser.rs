// src/cron/cron_parser.rs
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::schedule::ScheduleError;

/// Cron parser backed by the `cron` crate.
pub struct CronParser;

impl CronParser {
    /// Parse cron expression and calculate next execution time strictly after `from`.
    /// Format: "sec min hour day month weekday [year]"
    /// Example: "0 */5 * * * *" = every 5 minutes
    pub fn next_execution(cron_expr: &str, from: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        let schedule = Self::parse(cron_expr)?;
        schedule
            .after(&from)
            .next()
            .ok_or_else(|| ScheduleError::Exhausted {
                expression: cron_expr.to_string(),
                after: from,
            })
    }

    /// Validate an expression without computing anything.
    pub fn validate(cron_expr: &str) -> Result<(), ScheduleError> {
        Self::parse(cron_expr).map(|_| ())
    }

    fn parse(cron_expr: &str) -> Result<::cron::Schedule, ScheduleError> {
        let parts = cron_expr.split_whitespace().count();
        if !(6..=7).contains(&parts) {
            return Err(ScheduleError::InvalidExpression {
                expression: cron_expr.to_string(),
                reason: format!(
                    "expected 6 or 7 fields (sec min hour day month weekday [year]), got {parts}"
                ),
            });
        }

        ::cron::Schedule::from_str(cron_expr).map_err(|e| ScheduleError::InvalidExpression {
            expression: cron_expr.to_string(),
            reason: e.to_string(),
        })
    }
}
