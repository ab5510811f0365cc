//! Domain error types
//!
//! This module defines error types for domain-level validation failures,
//! chiefly path normalization problems detected before any network activity.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Path is not within the configured source root
    #[error("Path not within source root: {0}")]
    PathNotInSourceRoot(String),

    /// Path contains bytes that are not valid UTF-8
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}
