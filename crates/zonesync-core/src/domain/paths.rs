//! Path normalization
//!
//! Local files and remote objects must agree on one canonical key format:
//! relative to the root, forward-slash separated, no leading slash, with
//! directories carrying a trailing slash. If the two sides ever disagree,
//! every file looks changed and is re-uploaded only to be deleted again by
//! the cleanup pass, so this is the correctness-critical invariant of the
//! whole design.

use std::path::{Component, Path};

use super::errors::DomainError;

/// Computes the normalized remote key for a local file.
///
/// `path` must be located underneath `root`. The result uses `/` separators
/// regardless of platform and carries no leading separator, e.g. a file at
/// `<root>/nd1/file2` yields `nd1/file2`.
pub fn relative_key(root: &Path, path: &Path) -> Result<String, DomainError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| DomainError::PathNotInSourceRoot(path.display().to_string()))?;

    let mut key = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| DomainError::NonUtf8Path(path.display().to_string()))?;
                if !key.is_empty() {
                    key.push('/');
                }
                key.push_str(part);
            }
            // `..`, `.` and root components would break the bijection
            // between local paths and remote keys.
            _ => return Err(DomainError::InvalidPath(path.display().to_string())),
        }
    }

    if key.is_empty() {
        return Err(DomainError::InvalidPath(path.display().to_string()));
    }

    Ok(key)
}
