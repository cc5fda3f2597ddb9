//! keylogd - key event sink
//!
//! Spawned by the UI process with its stdin connected to a pipe. Every line
//! is one JSON key event; each is appended to a CSV log until the pipe
//! closes.

use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use keylogd::{ConfigSources, LineProcessor, SinkConfig};

#[derive(Parser, Debug)]
#[command(name = "keylogd", version)]
#[command(about = "Append key events read from stdin to a CSV log")]
struct Cli {
    /// CSV file to append to (or use KEYLOGD_LOG_FILE env var)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Path to a keylogd.toml configuration file (or use KEYLOGD_CONFIG env var)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Do not echo a confirmation line per logged event
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::from(2);
        }
    };

    let mut processor = LineProcessor::new(&config).echo(!cli.quiet);
    let outcome = processor.run(io::stdin().lock(), io::stdout().lock());

    let summary = processor.summary();
    debug!(
        lines_read = summary.lines_read,
        records_written = summary.records_written,
        decode_errors = summary.decode_errors,
        write_errors = summary.write_errors,
        "Run finished"
    );

    // The fatal error was already reported by the processor.
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn load_config(cli: &Cli) -> Result<SinkConfig> {
    let sources = ConfigSources::from_env(cli.log_file.clone(), cli.config.clone());
    SinkConfig::resolve(&sources).context("failed to load keylogd configuration")
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        match env::var("RUST_LOG") {
            Ok(directives) if !directives.trim().is_empty() => env_filter(&directives),
            _ => EnvFilter::new("info"),
        }
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .try_init();
}

/// `RUST_LOG` filter that always passes this crate's warn and error events.
/// Directives that name this crate are taken as is.
fn env_filter(directives: &str) -> EnvFilter {
    let filter = EnvFilter::new(directives);
    if directives.contains(env!("CARGO_CRATE_NAME")) {
        return filter;
    }
    match diagnostics_directive(directives).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// `keylogd=<level>` at the global level in `directives`, but never below warn.
fn diagnostics_directive(directives: &str) -> String {
    let global = directives
        .split(',')
        .map(str::trim)
        .filter(|d| !d.contains('=') && !d.contains('['))
        .filter_map(|d| d.parse::<LevelFilter>().ok())
        .last()
        .unwrap_or(LevelFilter::WARN);
    let level = global.max(LevelFilter::WARN);
    format!("{}={}", env!("CARGO_CRATE_NAME"), level).to_lowercase()
}
