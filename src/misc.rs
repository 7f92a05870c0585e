use crate::types::TimeZone;
use chrono::{Local, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Formats the current wall-clock time as `YYYY-MM-DD HH:MM:SS.mmm`.
pub fn timestamp(timezone: TimeZone) -> String {
    match timezone {
        TimeZone::Utc => Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        TimeZone::Local => Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}
