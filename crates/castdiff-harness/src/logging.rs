//! Structured logging for oracle runs.
//!
//! Two outputs: compact human-readable lines on the terminal and JSON lines
//! in `<log_dir>/castdiff.log.jsonl`, so a run over a log directory leaves
//! its own trace beside the logs it judged. `RUST_LOG` overrides the level.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// File name of the JSON-lines run log.
pub const RUN_LOG_FILE: &str = "castdiff.log.jsonl";

/// Returned by [`init_logging`]; keep it alive until the program exits.
#[derive(Debug)]
pub struct LogGuard {
    pub log_path: PathBuf,
}

/// `MakeWriter` over a shared file; each event holds the lock for one write.
#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

impl SharedFileWriter {
    fn new(file: File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            guard: self.file.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

struct SharedFileGuard<'a> {
    guard: MutexGuard<'a, File>,
}

impl Write for SharedFileGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.guard.flush()
    }
}

/// Install the global subscriber.
///
/// `verbose` lowers the default filter from `info` to `trace`.
///
/// # Errors
///
/// Fails if the directory or log file cannot be created, or a global
/// subscriber is already installed.
pub fn init_logging(log_dir: &Path, verbose: bool) -> io::Result<LogGuard> {
    fs::create_dir_all(log_dir)?;

    let default_level = if verbose { "trace" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_path = log_dir.join(RUN_LOG_FILE);
    let file_writer = SharedFileWriter::new(File::create(&log_path)?);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_target(true)
        .with_thread_ids(true);

    let terminal_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(terminal_layer)
        .with(json_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LogGuard { log_path })
}

/// Terminal-only logging for tests. Safe to call repeatedly.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_test_writer()
                .compact(),
        )
        .try_init();
}

/// Run `f`, logging `operation`, `plan`, `elapsed_ms` and `success`.
pub fn log_timed_operation<T, E: std::fmt::Display>(
    operation: &str,
    plan: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let start = Instant::now();
    let result = f();
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    match &result {
        Ok(_) => tracing::info!(operation, plan, elapsed_ms, success = true, "operation complete"),
        Err(e) => tracing::warn!(
            operation,
            plan,
            elapsed_ms,
            success = false,
            error = %e,
            "operation failed"
        ),
    }
    result
}
