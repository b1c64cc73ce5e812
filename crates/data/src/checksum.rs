//! Content hashing for downloaded sample assets.

use std::{fs, path::Path};

use anyhow::{Context, Result};

/// Compute the MD5 digest of a file's full contents as a lowercase hex
/// string.
pub fn md5_hex(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;
    Ok(format!("{:x}", md5::compute(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sample.bin");
        fs::write(&path, b"hello world").expect("write sample");
        assert_eq!(
            md5_hex(&path).expect("digest"),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn single_flipped_byte_changes_digest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sample.bin");
        fs::write(&path, b"hello world").expect("write sample");
        let before = md5_hex(&path).expect("digest");
        fs::write(&path, b"hello worle").expect("write altered");
        let after = md5_hex(&path).expect("digest");
        assert_ne!(before, after);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(md5_hex(dir.path().join("absent.bin")).is_err());
    }
}
