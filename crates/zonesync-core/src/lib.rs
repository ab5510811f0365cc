//! Zonesync Core - Domain logic and port definitions
//!
//! This crate contains the dependency-free center of zonesync:
//! - **Domain types** - `RemoteEntry`, path normalization, content digests
//! - **Port definitions** - the `StorageBackend` trait implemented by adapters
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure logic with no I/O. Ports define trait
//! interfaces that adapter crates implement; the engine crate orchestrates
//! the domain through those ports.

pub mod domain;
pub mod ports;
