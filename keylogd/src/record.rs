//! CSV row formatting.
//!
//! Fields are joined with bare commas. Nothing is quoted or escaped, so a
//! key containing a comma produces a row with extra columns.

use std::fmt;

use chrono::{DateTime, Local};

use crate::entry::LogEntry;

pub const CSV_HEADER: &str = "System Timestamp,JS Performance Time (s),Key,Action";

/// Local wall-clock time with millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One row of the CSV log, fully formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub timestamp: String,
    pub seconds: String,
    pub key: String,
    pub action: String,
}

impl CsvRecord {
    pub fn new(entry: LogEntry, written_at: &DateTime<Local>) -> Self {
        Self {
            timestamp: written_at.format(TIMESTAMP_FORMAT).to_string(),
            seconds: format_seconds(entry.time_ms),
            key: entry.key,
            action: entry.action,
        }
    }

    /// Line printed on stdout once the row is on disk.
    pub fn confirmation(&self) -> String {
        format!("Logged: {} {} at {}", self.key, self.action, self.seconds)
    }
}

impl fmt::Display for CsvRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.timestamp, self.seconds, self.key, self.action
        )
    }
}

/// Milliseconds to seconds, six decimal places.
pub fn format_seconds(time_ms: f64) -> String {
    format!("{:.6}", time_ms / 1000.0)
}
