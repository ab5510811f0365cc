//! Zonesync Storage - Edge Storage HTTP adapter
//!
//! Implements the [`StorageBackend`] port against a Bunny-style Edge
//! Storage API: a flat HTTP surface where `GET` lists a directory as JSON,
//! `PUT` creates an object, and `DELETE` removes one, all authenticated by
//! an `AccessKey` header.
//!
//! ## Modules
//!
//! - [`client`] - the `reqwest`-based [`StorageClient`]

pub mod client;

pub use client::StorageClient;

#[doc(no_inline)]
pub use zonesync_core::ports::StorageBackend;
