//! Storage backend port (driven/secondary port)
//!
//! This module defines the interface for the remote object store. The
//! primary implementation targets a Bunny-style Edge Storage HTTP API, but
//! the trait is deliberately reduced to the three primitives the sync
//! engine needs so that tests can substitute an in-memory double.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification; the
//!   engine wraps them with operation kind and path.
//! - Uses `#[async_trait]` for async trait methods.
//! - Every call carries its own fixed timeout inside the adapter; the
//!   run-scoped cancellation signal is layered on top by the engine.

use async_trait::async_trait;

use crate::domain::RemoteEntry;

/// Remote object-storage operations consumed by the sync engine.
///
/// All three operations are terminal on failure: the engine performs no
/// retries, so adapters should not either.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Lists one remote directory.
    ///
    /// `path` is a normalized directory path (trailing slash, no leading
    /// slash) or `"/"` for the zone root. Returned entries carry normalized
    /// paths relative to the zone root.
    async fn list(&self, path: &str) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Uploads the full content of one object.
    ///
    /// Succeeds only when the store acknowledges creation; any other
    /// outcome is a hard error.
    async fn upload(&self, path: &str, data: &[u8]) -> anyhow::Result<()>;

    /// Deletes one object.
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
}
