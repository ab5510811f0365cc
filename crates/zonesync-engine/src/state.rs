//! Remote state index
//!
//! The [`RemoteStateIndex`] is the only piece of state shared by every
//! concurrent task of a sync run: a map from normalized remote file path to
//! content checksum. It is populated once by a full remote listing, shrinks
//! monotonically while the pipeline reconciles local files, and whatever
//! survives reconciliation names exactly the remote files with no local
//! counterpart.
//!
//! The map sits behind a reader/writer lock. Lookups and removals are the
//! only critical sections; no I/O or hashing ever happens while the lock
//! is held.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use zonesync_core::ports::StorageBackend;

use crate::SyncError;

/// Mapping of normalized remote file path → uppercase-hex checksum.
///
/// Created empty, filled once by [`initialize`](Self::initialize), and
/// mutated only by removals afterwards. Never persisted: the remote store
/// itself is the durable state between runs.
#[derive(Debug, Default)]
pub struct RemoteStateIndex {
    files: RwLock<HashMap<String, String>>,
}

impl RemoteStateIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the index from a full remote tree listing.
    ///
    /// Breadth-first, queue-driven traversal starting at the zone root:
    /// directories returned by [`StorageBackend::list`] are enqueued for
    /// further listing, files are inserted with their checksum. Any listing
    /// failure aborts immediately; a partially populated index must not be
    /// used for a sync.
    pub async fn initialize(
        &self,
        backend: &dyn StorageBackend,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError> {
        let mut directories = VecDeque::from(["/".to_string()]);

        while let Some(directory) = directories.pop_front() {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            let entries = tokio::select! {
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                result = backend.list(&directory) => result.map_err(|source| SyncError::Listing {
                    path: directory.clone(),
                    source,
                })?,
            };

            for entry in entries {
                if entry.is_directory {
                    directories.push_back(entry.path);
                } else {
                    self.insert(entry.path, entry.checksum);
                }
            }
        }

        debug!(files = self.len(), "remote state index initialized");
        Ok(())
    }

    fn insert(&self, path: String, checksum: String) {
        self.files
            .write()
            .expect("remote state index lock poisoned")
            .insert(path, checksum);
    }

    /// Returns the recorded checksum for a normalized remote path, if any.
    #[must_use]
    pub fn checksum(&self, path: &str) -> Option<String> {
        self.files
            .read()
            .expect("remote state index lock poisoned")
            .get(path)
            .cloned()
    }

    /// Removes a path from the index.
    ///
    /// This is the reconciliation step: once a local file has been
    /// accounted for (matched or uploaded), its path must disappear from
    /// the index so the cleanup pass will not delete it.
    pub fn remove(&self, path: &str) {
        self.files
            .write()
            .expect("remote state index lock poisoned")
            .remove(path);
    }

    /// Number of paths still in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files
            .read()
            .expect("remote state index lock poisoned")
            .len()
    }

    /// True when no paths remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the paths still in the index.
    ///
    /// Taken by the cleanup pass after the pipeline has joined, so no
    /// concurrent removals can race with it.
    #[must_use]
    pub fn remaining(&self) -> Vec<String> {
        self.files
            .read()
            .expect("remote state index lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}
