//! Remote entry types
//!
//! A [`RemoteEntry`] is one row of a storage listing after the adapter has
//! normalized it: the path is relative to the storage-zone root with no
//! leading slash, and directories carry a trailing slash.

/// One entry of a remote directory listing, with its path already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Normalized path relative to the zone root. Directories end in `/`.
    pub path: String,
    /// Uppercase-hex SHA-256 checksum of the object content.
    /// Empty for directories.
    pub checksum: String,
    /// Whether this entry names a directory rather than an object.
    pub is_directory: bool,
}

impl RemoteEntry {
    /// Creates a file entry.
    #[must_use]
    pub fn file(path: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            checksum: checksum.into(),
            is_directory: false,
        }
    }

    /// Creates a directory entry. The stored path is given a trailing slash
    /// if it does not already have one.
    #[must_use]
    pub fn directory(path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.ends_with('/') {
            path.push('/');
        }
        Self {
            path,
            checksum: String::new(),
            is_directory: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_gains_trailing_slash() {
        let entry = RemoteEntry::directory("nd1");
        assert_eq!(entry.path, "nd1/");
        assert!(entry.is_directory);
        assert!(entry.checksum.is_empty());
    }

    #[test]
    fn test_directory_keeps_existing_trailing_slash() {
        assert_eq!(RemoteEntry::directory("nd1/").path, "nd1/");
    }

    #[test]
    fn test_file_entry() {
        let entry = RemoteEntry::file("nd1/file2", "ABCD");
        assert!(!entry.is_directory);
        assert_eq!(entry.checksum, "ABCD");
    }
}
