//! The line processor: read a line, decode it, append it, repeat.
//!
//! Decode and write failures are logged at warn level and the loop carries
//! on. Any other failure is logged at error level and ends the run. End of
//! input ends the run normally.

use std::io::{BufRead, Write};

use tracing::{debug, error, warn};

use crate::clock::{epoch_millis, Clock, SystemClock};
use crate::config::SinkConfig;
use crate::csv_log::CsvLog;
use crate::entry::{parse_line, LogEntry};
use crate::errors::{KeylogError, KeylogResult};
use crate::record::CsvRecord;

/// Counters for one run of the processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: u64,
    pub records_written: u64,
    pub decode_errors: u64,
    pub write_errors: u64,
}

pub struct LineProcessor<C = SystemClock> {
    log: CsvLog,
    clock: C,
    echo: bool,
    summary: RunSummary,
}

impl LineProcessor<SystemClock> {
    pub fn new(config: &SinkConfig) -> Self {
        Self::with_clock(CsvLog::new(&config.log_file), SystemClock)
    }
}

impl<C: Clock> LineProcessor<C> {
    pub fn with_clock(log: CsvLog, clock: C) -> Self {
        Self {
            log,
            clock,
            echo: true,
            summary: RunSummary::default(),
        }
    }

    /// Toggle the `Logged: ...` confirmation lines.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Process `input` until end of stream or a fatal error.
    ///
    /// Confirmation lines go to `out`. The returned error, if any, has
    /// already been logged.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> KeylogResult<()> {
        debug!("Appending key events to {}", self.log.path().display());
        let mut line = String::new();
        loop {
            line.clear();
            let read = match input.read_line(&mut line) {
                Ok(n) => n,
                Err(e) => {
                    let err = KeylogError::unexpected(format!("failed to read input: {e}"));
                    error!("{err}");
                    return Err(err);
                }
            };
            if read == 0 {
                debug!("Input closed");
                return Ok(());
            }
            self.summary.lines_read += 1;

            match self.process_line(&line) {
                Ok(record) => {
                    self.summary.records_written += 1;
                    if self.echo {
                        confirm(&mut out, &record);
                    }
                }
                Err(err @ KeylogError::Decode { .. }) => {
                    self.summary.decode_errors += 1;
                    warn!("{err}");
                }
                Err(err @ KeylogError::Write { .. }) => {
                    self.summary.write_errors += 1;
                    warn!("{err}");
                }
                Err(err) => {
                    error!("{err}");
                    return Err(err);
                }
            }
        }
    }

    /// Decode one raw line and append it to the log.
    pub fn process_line(&self, raw: &str) -> KeylogResult<CsvRecord> {
        let value = parse_line(raw.trim())?;
        let now = self.clock.now();
        let entry = LogEntry::from_value(&value, epoch_millis(&now))?;
        let record = CsvRecord::new(entry, &now);
        self.log.append(&record)?;
        Ok(record)
    }
}

/// The row is already on disk; a closed stdout only costs the echo.
fn confirm<W: Write>(out: &mut W, record: &CsvRecord) {
    let result = writeln!(out, "{}", record.confirmation()).and_then(|_| out.flush());
    if let Err(e) = result {
        warn!("Failed to write confirmation: {e}");
    }
}
