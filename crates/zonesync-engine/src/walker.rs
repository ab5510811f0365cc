//! Local directory walker
//!
//! The walker is the producer side of the reconciliation pipeline: it
//! traverses the source tree iteratively (a stack of pending directories,
//! no recursion) and sends every regular file it finds into the bounded
//! path queue. The queue's capacity is the pipeline's backpressure: when
//! the workers fall behind, the walker blocks on `send` instead of running
//! ahead.
//!
//! Symbolic links, sockets and other non-regular entries are skipped and
//! never followed. Any traversal error fails the whole run.

use std::path::PathBuf;

use tokio::fs;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::SyncError;

/// Walks `root` and sends every regular-file path into `paths`.
///
/// Returns `Ok(())` once the tree is exhausted or the receiving side of
/// the queue has gone away (the workers are unwinding and will report
/// their own error). Stops with [`SyncError::Cancelled`] as soon as the
/// shared token fires.
pub(crate) async fn walk(
    root: PathBuf,
    paths: mpsc::Sender<PathBuf>,
    cancel: CancellationToken,
) -> Result<(), SyncError> {
    let mut pending = vec![root];

    while let Some(directory) = pending.pop() {
        let mut entries = fs::read_dir(&directory).await.map_err(|source| {
            SyncError::LocalIo {
                path: directory.clone(),
                source,
            }
        })?;

        loop {
            let entry = entries.next_entry().await.map_err(|source| {
                SyncError::LocalIo {
                    path: directory.clone(),
                    source,
                }
            })?;
            let Some(entry) = entry else { break };

            // file_type() does not follow symlinks, so a link to a
            // directory is neither descended into nor emitted.
            let file_type = entry.file_type().await.map_err(|source| {
                SyncError::LocalIo {
                    path: entry.path(),
                    source,
                }
            })?;

            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                trace!(path = %entry.path().display(), "walker found file");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                    sent = paths.send(entry.path()) => {
                        if sent.is_err() {
                            // All workers are gone; their error wins.
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
