//! keylogd
//!
//! Reads key events from a pipe, one JSON object per line, and appends each
//! one as a row of a CSV file.

pub mod clock;
pub mod config;
pub mod csv_log;
pub mod entry;
pub mod errors;
pub mod processor;
pub mod record;

pub use config::{ConfigSources, SinkConfig};
pub use errors::{KeylogError, KeylogResult};
pub use processor::{LineProcessor, RunSummary};
