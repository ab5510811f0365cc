//! Zonesync Engine - Directory-to-zone reconciliation
//!
//! Drives a full sync run against a [`StorageBackend`]: the remote state
//! index is built from a full listing, a bounded-concurrency pipeline
//! hashes and uploads local files while draining the index, and a final
//! cleanup pass deletes whatever the index still holds.
//!
//! ## Modules
//!
//! - [`engine`] - the [`SyncEngine`] orchestrating the three phases
//! - [`state`] - the shared [`RemoteStateIndex`]
//! - [`report`] - the `+`/`-` decision protocol writer
//!
//! [`StorageBackend`]: zonesync_core::ports::StorageBackend

use std::path::PathBuf;

use thiserror::Error;

pub mod engine;
pub mod report;
pub mod state;
mod walker;

pub use engine::{SyncConfig, SyncEngine, SyncPhase, SyncSummary};
pub use report::SyncReporter;
pub use state::RemoteStateIndex;

/// Errors that can occur during a sync run.
///
/// Every variant is terminal: the engine never retries, and a single
/// failure converts the whole run into a failure result. Partial progress
/// (uploads or deletes that already completed) is not rolled back.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid configuration, detected before any network activity
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The initial full-tree listing failed; no partial index is usable
    #[error("remote listing of {path:?} failed: {source}")]
    Listing {
        /// The remote directory whose listing failed
        path: String,
        /// The underlying backend error
        source: anyhow::Error,
    },

    /// A local file or directory could not be read during traversal
    #[error("failed to read {path}: {source}")]
    LocalIo {
        /// The local path that failed
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// An upload was rejected by the backend or failed in transport
    #[error("failed to upload {path:?}: {source}")]
    Upload {
        /// The normalized remote path of the failed upload
        path: String,
        /// The underlying backend error
        source: anyhow::Error,
    },

    /// A delete was rejected by the backend or failed in transport
    #[error("failed to delete {path:?}: {source}")]
    Delete {
        /// The normalized remote path of the failed delete
        path: String,
        /// The underlying backend error
        source: anyhow::Error,
    },

    /// A local path could not be normalized into a remote key
    #[error(transparent)]
    Domain(#[from] zonesync_core::domain::DomainError),

    /// The run-scoped cancellation signal fired
    #[error("sync cancelled")]
    Cancelled,

    /// A pipeline task panicked or was aborted
    #[error("sync task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
