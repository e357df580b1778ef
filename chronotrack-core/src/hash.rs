use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Streaming SHA-256 fingerprint of a file's contents, hex-encoded.
///
/// The digest is the sole criterion for change detection: identical bytes
/// always produce identical fingerprints, regardless of mtime.
pub fn fingerprint_file<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 fingerprint of an in-memory buffer.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint_bytes(b"hello");
        let b = fingerprint_bytes(b"hello");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_differs_on_content() {
        assert_ne!(fingerprint_bytes(b"hello"), fingerprint_bytes(b"world"));
    }

    #[test]
    fn test_fingerprint_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello").unwrap();

        assert_eq!(fingerprint_file(&path).unwrap(), fingerprint_bytes(b"hello"));
    }

    #[test]
    fn test_fingerprint_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(fingerprint_file(dir.path().join("nope.txt")).is_err());
    }
}
