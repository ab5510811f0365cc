//! Domain types and pure logic
//!
//! This module contains the core domain types for zonesync:
//! - Content digest computation (SHA-256, uppercase hex)
//! - Path normalization shared by the local walker and the remote listing
//! - Remote entry types produced by storage listings
//! - Domain-specific error types

pub mod digest;
pub mod errors;
pub mod paths;
pub mod remote;

// Re-export commonly used types
pub use digest::content_digest;
pub use errors::DomainError;
pub use paths::relative_key;
pub use remote::RemoteEntry;
