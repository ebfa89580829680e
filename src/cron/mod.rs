pub mod cron_parser;
pub mod schedule;

pub use cron_parser::CronParser;
pub use schedule::{Schedule, ScheduleError};
