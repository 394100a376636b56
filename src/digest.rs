//! Content digest utility.
//!
//! Digests are used for duplicate detection only, never for authentication.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 digest of a payload as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex(b"test data");
        assert_eq!(hash.len(), 64);
        // Known SHA-256 of "test data"
        assert_eq!(
            hash,
            "916f0027a575074ce72a331777c3478d6513f786a591bd892da1a577bf2335f9"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex(b"same bytes"), sha256_hex(b"same bytes"));
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }
}
