//! Sync decision reporting
//!
//! The engine's observable output protocol is one line per decision:
//! `+ <path>` for every upload decision and `- <path>` for every deletion
//! decision. Lines from concurrent workers interleave in no particular
//! order. Dry-run mode still emits every line; only the backend calls are
//! suppressed.
//!
//! Diagnostics go to `tracing`; this writer carries only the protocol.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::warn;

/// Serializes `+`/`-` protocol lines from concurrent workers and counts
/// the decisions for the end-of-run summary.
pub struct SyncReporter {
    out: Mutex<Box<dyn Write + Send>>,
    uploads: AtomicU64,
    deletions: AtomicU64,
}

impl SyncReporter {
    /// Creates a reporter writing to the given sink.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            uploads: AtomicU64::new(0),
            deletions: AtomicU64::new(0),
        }
    }

    /// Creates a reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Records an upload decision: emits `+ <path>`.
    pub fn record_upload(&self, path: &str) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        self.emit('+', path);
    }

    /// Records a deletion decision: emits `- <path>`.
    pub fn record_delete(&self, path: &str) {
        self.deletions.fetch_add(1, Ordering::Relaxed);
        self.emit('-', path);
    }

    /// Number of upload decisions recorded so far.
    #[must_use]
    pub fn uploads(&self) -> u64 {
        self.uploads.load(Ordering::Relaxed)
    }

    /// Number of deletion decisions recorded so far.
    #[must_use]
    pub fn deletions(&self) -> u64 {
        self.deletions.load(Ordering::Relaxed)
    }

    fn emit(&self, sign: char, path: &str) {
        match self.out.lock() {
            Ok(mut out) => {
                if let Err(error) = writeln!(out, "{sign} {path}") {
                    warn!(%error, path, "failed to write sync report line");
                }
            }
            Err(_) => warn!(path, "sync report writer poisoned"),
        }
    }
}

impl std::fmt::Debug for SyncReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncReporter")
            .field("uploads", &self.uploads())
            .field("deletions", &self.deletions())
            .finish()
    }
}
