//! Checksum utilities for distribution archive verification

use crate::error::{NasrError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::io::Read;
use std::path::Path;

/// Checksum algorithm type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha512,
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumAlgorithm::Sha256 => write!(f, "sha256"),
            ChecksumAlgorithm::Sha512 => write!(f, "sha512"),
        }
    }
}

impl std::str::FromStr for ChecksumAlgorithm {
    type Err = NasrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            "sha512" => Ok(ChecksumAlgorithm::Sha512),
            _ => Err(NasrError::Parse(format!("unknown checksum algorithm: {}", s))),
        }
    }
}

/// Compute checksum for a file
pub fn compute_file_checksum(
    path: impl AsRef<Path>,
    algorithm: ChecksumAlgorithm,
) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    compute_checksum(&mut file, algorithm)
}

/// Compute checksum for any readable source
pub fn compute_checksum<R: Read>(reader: &mut R, algorithm: ChecksumAlgorithm) -> Result<String> {
    match algorithm {
        ChecksumAlgorithm::Sha256 => hash_reader::<Sha256, R>(reader),
        ChecksumAlgorithm::Sha512 => hash_reader::<Sha512, R>(reader),
    }
}

fn hash_reader<D: Digest, R: Read>(reader: &mut R) -> Result<String> {
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify checksum for a file, failing with a mismatch error on disagreement
pub fn verify_file_checksum(
    path: impl AsRef<Path>,
    expected: &str,
    algorithm: ChecksumAlgorithm,
) -> Result<()> {
    let actual = compute_file_checksum(path, algorithm)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(NasrError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_compute_checksum_sha256() {
        let data = b"hello world";
        let mut cursor = Cursor::new(data);
        let checksum = compute_checksum(&mut cursor, ChecksumAlgorithm::Sha256).unwrap();
        assert_eq!(checksum, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
    }

    #[test]
    fn test_compute_checksum_sha512() {
        let data = b"hello world";
        let mut cursor = Cursor::new(data);
        let checksum = compute_checksum(&mut cursor, ChecksumAlgorithm::Sha512).unwrap();
        assert_eq!(
            checksum,
            "309ecc489c12d6eb4cc40f50c902f2b4d0ed77ee511a7c7a9bcd3ca86d4cd86f989dd35bc5ff499670da34255b45b0cfd830e81f605dcf7dc5542e93ae9cd76f"
        );
    }

    #[test]
    fn test_verify_file_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        std::fs::write(&path, b"not really a zip").unwrap();

        let err = verify_file_checksum(&path, "deadbeef", ChecksumAlgorithm::Sha256).unwrap_err();
        assert!(matches!(err, NasrError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("sha256".parse::<ChecksumAlgorithm>().unwrap(), ChecksumAlgorithm::Sha256);
        assert_eq!("SHA512".parse::<ChecksumAlgorithm>().unwrap(), ChecksumAlgorithm::Sha512);
        assert!("md5".parse::<ChecksumAlgorithm>().is_err());
    }
}
