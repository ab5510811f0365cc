//! Sync engine
//!
//! The [`SyncEngine`] drives one run through a strict phase sequence:
//!
//! ```text
//! Idle → Listing → Reconciling → Cleaning → Done
//!              \        |            /
//!               `---- Failed <------'
//! ```
//!
//! - **Listing** builds the [`RemoteStateIndex`] from a full remote
//!   listing (single-threaded, queue-driven).
//! - **Reconciling** runs the walker + bounded queue + worker pool
//!   pipeline: hash every local file, upload on mismatch, drain the index.
//! - **Cleaning** deletes every index entry that survived reconciliation,
//!   gated by a counting semaphore.
//!
//! Any failure moves the run to `Failed` and terminates it; there are no
//! retry transitions. Dry-run only suppresses the mutating backend calls;
//! listing, hashing, diffing and the `+`/`-` protocol are unaffected.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::{mpsc, Mutex as AsyncMutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use zonesync_core::domain::{content_digest, relative_key};
use zonesync_core::ports::StorageBackend;

use crate::report::SyncReporter;
use crate::state::RemoteStateIndex;
use crate::{walker, SyncError};

/// Default number of reconciliation workers.
const DEFAULT_WORKERS: usize = 10;

/// Default bound on in-flight backend calls (pipeline queue capacity and
/// cleanup semaphore permits).
const DEFAULT_CONNECTION_LIMIT: usize = 25;

/// Tuning knobs for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Size of the reconciliation worker pool
    pub workers: usize,
    /// Capacity of the path queue and of the cleanup semaphore
    pub connection_limit: usize,
    /// When set, no mutating backend call is issued
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            connection_limit: DEFAULT_CONNECTION_LIMIT,
            dry_run: false,
        }
    }
}

/// Phase of a sync run. `Failed` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No run started yet
    Idle,
    /// Building the remote state index
    Listing,
    /// Diff/upload pipeline running
    Reconciling,
    /// Deleting stale remote entries
    Cleaning,
    /// Run finished successfully
    Done,
    /// Run terminated by an error or cancellation
    Failed,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Listing => "listing",
            Self::Reconciling => "reconciling",
            Self::Cleaning => "cleaning",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a completed sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Number of upload decisions (files new or changed locally)
    pub files_uploaded: u64,
    /// Number of deletion decisions (remote files with no local counterpart)
    pub files_deleted: u64,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

/// Orchestrates one sync run. Build one engine per run.
pub struct SyncEngine {
    backend: Arc<dyn StorageBackend>,
    index: Arc<RemoteStateIndex>,
    reporter: Arc<SyncReporter>,
    config: SyncConfig,
    cancel: CancellationToken,
    phase: Mutex<SyncPhase>,
}

impl SyncEngine {
    /// Creates an engine over the given backend.
    ///
    /// `cancel` is the run-scoped cancellation token; the caller wires it
    /// to operator interrupts, and the engine triggers it itself on the
    /// first hard error so all sibling tasks unwind promptly.
    #[must_use]
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        reporter: SyncReporter,
        config: SyncConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            backend,
            index: Arc::new(RemoteStateIndex::new()),
            reporter: Arc::new(reporter),
            config,
            cancel,
            phase: Mutex::new(SyncPhase::Idle),
        }
    }

    /// Current phase of the run.
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        *self.phase.lock().expect("phase lock poisoned")
    }

    fn enter(&self, phase: SyncPhase) {
        info!(%phase, "entering sync phase");
        *self.phase.lock().expect("phase lock poisoned") = phase;
    }

    /// Runs a full sync of `source` against the remote zone.
    ///
    /// On success the remote zone mirrors the local tree and the index has
    /// been fully drained. On failure the remote store may be left between
    /// two consistent snapshots; nothing is rolled back.
    pub async fn run(&self, source: &Path) -> Result<SyncSummary, SyncError> {
        let started = Instant::now();

        match self.run_phases(source).await {
            Ok(()) => {
                self.enter(SyncPhase::Done);
                Ok(SyncSummary {
                    files_uploaded: self.reporter.uploads(),
                    files_deleted: self.reporter.deletions(),
                    duration_ms: started.elapsed().as_millis() as u64,
                })
            }
            Err(error) => {
                self.enter(SyncPhase::Failed);
                Err(error)
            }
        }
    }

    async fn run_phases(&self, source: &Path) -> Result<(), SyncError> {
        let source = verify_source(source).await?;

        self.enter(SyncPhase::Listing);
        self.index
            .initialize(self.backend.as_ref(), &self.cancel)
            .await?;

        self.enter(SyncPhase::Reconciling);
        self.reconcile(&source).await?;

        self.enter(SyncPhase::Cleaning);
        self.cleanup().await
    }

    /// Walker → bounded queue → worker pool.
    ///
    /// The queue capacity equals the connection limit, so the walker can
    /// never run more than one queue ahead of the slowest worker.
    async fn reconcile(&self, source: &Path) -> Result<(), SyncError> {
        let (tx, rx) = mpsc::channel::<PathBuf>(self.config.connection_limit);
        let rx = Arc::new(AsyncMutex::new(rx));
        let mut tasks: JoinSet<Result<(), SyncError>> = JoinSet::new();

        tasks.spawn(walker::walk(
            source.to_path_buf(),
            tx,
            self.cancel.clone(),
        ));

        for _ in 0..self.config.workers {
            let worker = Worker {
                root: source.to_path_buf(),
                backend: Arc::clone(&self.backend),
                index: Arc::clone(&self.index),
                reporter: Arc::clone(&self.reporter),
                dry_run: self.config.dry_run,
                cancel: self.cancel.clone(),
            };
            tasks.spawn(worker.run(Arc::clone(&rx)));
        }

        self.join_first_error(tasks).await
    }

    /// Semaphore-gated fan-out over whatever the pipeline left in the index.
    async fn cleanup(&self) -> Result<(), SyncError> {
        let stale = self.index.remaining();
        if stale.is_empty() {
            return Ok(());
        }
        debug!(stale = stale.len(), "starting cleanup pass");

        let semaphore = Arc::new(Semaphore::new(self.config.connection_limit));
        let mut tasks: JoinSet<Result<(), SyncError>> = JoinSet::new();

        for path in stale {
            let semaphore = Arc::clone(&semaphore);
            let backend = Arc::clone(&self.backend);
            let reporter = Arc::clone(&self.reporter);
            let cancel = self.cancel.clone();
            let dry_run = self.config.dry_run;

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails
                // if the run is being torn down.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| SyncError::Cancelled)?;
                if cancel.is_cancelled() {
                    return Err(SyncError::Cancelled);
                }

                reporter.record_delete(&path);
                if !dry_run {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                        result = backend.delete(&path) => {
                            result.map_err(|source| SyncError::Delete { path, source })?;
                        }
                    }
                }
                Ok(())
            });
        }

        self.join_first_error(tasks).await
    }

    /// Joins every task; the first error cancels the shared token so the
    /// siblings unwind, and is returned after all of them have finished.
    async fn join_first_error(
        &self,
        mut tasks: JoinSet<Result<(), SyncError>>,
    ) -> Result<(), SyncError> {
        let mut first_error = None;

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_error) => Err(SyncError::Task(join_error)),
            };
            if let Err(error) = outcome {
                if first_error.is_none() {
                    self.cancel.cancel();
                    first_error = Some(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// One reconciliation worker: everything a pipeline task needs, cloned
/// from the engine so the task can be `'static`.
struct Worker {
    root: PathBuf,
    backend: Arc<dyn StorageBackend>,
    index: Arc<RemoteStateIndex>,
    reporter: Arc<SyncReporter>,
    dry_run: bool,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(
        self,
        paths: Arc<AsyncMutex<mpsc::Receiver<PathBuf>>>,
    ) -> Result<(), SyncError> {
        loop {
            // Hold the receiver lock only for the dequeue itself.
            let path = { paths.lock().await.recv().await };
            let Some(path) = path else { break };

            self.reconcile_one(&path).await?;

            if self.cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
        }
        Ok(())
    }

    /// Per-file causal order: read → hash → upload decision → index removal.
    ///
    /// The removal happens after any upload attempt so a failed upload
    /// never marks the file as accounted for.
    async fn reconcile_one(&self, path: &Path) -> Result<(), SyncError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| SyncError::LocalIo {
                path: path.to_path_buf(),
                source,
            })?;

        let key = relative_key(&self.root, path)?;
        let digest = content_digest(&data);

        let unchanged = self
            .index
            .checksum(&key)
            .is_some_and(|remote| remote == digest);

        if !unchanged {
            self.reporter.record_upload(&key);
            if !self.dry_run {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(SyncError::Cancelled),
                    result = self.backend.upload(&key, &data) => {
                        result.map_err(|source| SyncError::Upload { path: key.clone(), source })?;
                    }
                }
            }
        }

        self.index.remove(&key);
        Ok(())
    }
}

/// Resolves the source directory, failing before any network activity when
/// it does not exist or is not a directory.
async fn verify_source(source: &Path) -> Result<PathBuf, SyncError> {
    let not_a_directory = || {
        SyncError::Config(format!(
            "source path {} is not a directory or does not exist",
            source.display()
        ))
    };

    let metadata = tokio::fs::metadata(source)
        .await
        .map_err(|_| not_a_directory())?;
    if !metadata.is_dir() {
        return Err(not_a_directory());
    }

    tokio::fs::canonicalize(source)
        .await
        .map_err(|io_error| SyncError::LocalIo {
            path: source.to_path_buf(),
            source: io_error,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.workers, 10);
        assert_eq!(config.connection_limit, 25);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(SyncPhase::Reconciling.to_string(), "reconciling");
        assert_eq!(SyncPhase::Failed.to_string(), "failed");
    }
}
