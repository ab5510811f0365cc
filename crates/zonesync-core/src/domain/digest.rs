//! Content digest computation
//!
//! Files are compared by whole-content SHA-256 digests rendered as uppercase
//! hex, matching the checksum format the storage API reports in listings.
//! The digest depends only on the file bytes, never on metadata such as
//! timestamps, so identical content always hashes identically across runs.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of `data`, rendered as uppercase hex.
#[must_use]
pub fn content_digest(data: &[u8]) -> String {
    format!("{:X}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let a = content_digest(b"hello world");
        let b = content_digest(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_differs_for_different_content() {
        assert_ne!(content_digest(b"hello"), content_digest(b"hello!"));
    }

    #[test]
    fn test_digest_is_uppercase_hex() {
        let digest = content_digest(b"zonesync");
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_known_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            content_digest(b""),
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }
}
