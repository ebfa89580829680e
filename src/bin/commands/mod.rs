pub mod jobs;

pub use self::jobs::*;
