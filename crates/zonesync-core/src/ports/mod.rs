//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the trait interfaces the engine depends on; their
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`StorageBackend`] - the remote object-storage primitives
//!   (list / upload / delete)

pub mod storage_backend;

pub use storage_backend::StorageBackend;
