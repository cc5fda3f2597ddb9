//! Append-only CSV log of key events
//!
//! Every append opens the file, writes, and drops the handle before
//! returning, so no handle outlives a single record. The header line is
//! written only when the file does not exist yet.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{KeylogError, KeylogResult};
use crate::record::{CsvRecord, CSV_HEADER};

#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file with its header if needed.
    pub fn append(&self, record: &CsvRecord) -> KeylogResult<()> {
        let is_new_file = !self.path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;

        let mut buf = String::new();
        if is_new_file {
            debug!("Creating {} with header", self.path.display());
            buf.push_str(CSV_HEADER);
            buf.push('\n');
        }
        buf.push_str(&record.to_string());
        buf.push('\n');

        file.write_all(buf.as_bytes())
            .map_err(|e| self.write_error(e))?;
        file.flush().map_err(|e| self.write_error(e))
    }

    fn write_error(&self, source: io::Error) -> KeylogError {
        KeylogError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(key: &str) -> CsvRecord {
        CsvRecord {
            timestamp: "2024-05-01 09:04:07.005".to_string(),
            seconds: "1.000000".to_string(),
            key: key.to_string(),
            action: "down".to_string(),
        }
    }

    #[test]
    fn new_file_gets_single_header() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let log = CsvLog::new(dir.path().join("keys.csv"));

        log.append(&record("a"))?;
        log.append(&record("b"))?;

        let contents = fs::read_to_string(log.path())?;
        assert_eq!(
            contents,
            format!(
                "{CSV_HEADER}\n\
                 2024-05-01 09:04:07.005,1.000000,a,down\n\
                 2024-05-01 09:04:07.005,1.000000,b,down\n"
            )
        );
        Ok(())
    }

    #[test]
    fn existing_file_is_appended_without_header() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("keys.csv");
        fs::write(&path, "earlier row\n")?;

        CsvLog::new(&path).append(&record("z"))?;

        let contents = fs::read_to_string(&path)?;
        assert_eq!(
            contents,
            "earlier row\n2024-05-01 09:04:07.005,1.000000,z,down\n"
        );
        Ok(())
    }

    #[test]
    fn file_is_not_created_until_first_append() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let log = CsvLog::new(dir.path().join("lazy.csv"));
        assert!(!log.path().exists());
        log.append(&record("a"))?;
        assert!(log.path().exists());
        Ok(())
    }

    #[test]
    fn open_failure_is_a_write_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let log = CsvLog::new(dir.path().join("missing").join("keys.csv"));

        let err = log.append(&record("a")).unwrap_err();
        assert!(matches!(err, KeylogError::Write { .. }));
        assert!(err.is_recoverable());
        assert!(err.to_string().starts_with("Error writing to log file: "));
        Ok(())
    }

    #[test]
    fn directory_path_is_a_write_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = CsvLog::new(dir.path()).append(&record("a")).unwrap_err();
        assert!(matches!(err, KeylogError::Write { .. }));
        Ok(())
    }
}
