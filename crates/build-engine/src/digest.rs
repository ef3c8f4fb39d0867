//! Tarball integrity verification
//!
//! The hash algorithm is selected purely by the character length of the
//! declared hex digest, so recipe declarations stay a single string.

use std::fmt;
use std::path::Path;

use sha2::Digest;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::BuildError;

/// Read size for the incremental hash loop
const CHUNK_SIZE: usize = 64 * 1024;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Select the algorithm from the hex digest length
    pub fn from_hex_len(len: usize) -> Result<Self, BuildError> {
        match len {
            32 => Ok(DigestAlgorithm::Md5),
            40 => Ok(DigestAlgorithm::Sha1),
            64 => Ok(DigestAlgorithm::Sha256),
            128 => Ok(DigestAlgorithm::Sha512),
            other => Err(BuildError::DigestLength(other)),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha512 => "SHA-512",
        };
        f.write_str(name)
    }
}

async fn hash_file<D: Digest>(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute the hex digest of a file, streaming it in fixed-size chunks
pub async fn file_digest(path: &Path, algorithm: DigestAlgorithm) -> std::io::Result<String> {
    match algorithm {
        DigestAlgorithm::Md5 => hash_file::<md5::Md5>(path).await,
        DigestAlgorithm::Sha1 => hash_file::<sha1::Sha1>(path).await,
        DigestAlgorithm::Sha256 => hash_file::<sha2::Sha256>(path).await,
        DigestAlgorithm::Sha512 => hash_file::<sha2::Sha512>(path).await,
    }
}

/// Verify a file against its expected hex digest.
///
/// A missing file propagates the io error so the caller can distinguish
/// "absent" from "corrupt".
pub async fn verify(path: &Path, expected: &str) -> Result<bool, BuildError> {
    let algorithm = DigestAlgorithm::from_hex_len(expected.len())?;
    let actual = file_digest(path, algorithm).await?;

    if actual == expected {
        debug!("{} digest verified for {:?}", algorithm, path);
        Ok(true)
    } else {
        warn!(
            "{} mismatch for {:?}: expected {}, got {}",
            algorithm, path, expected, actual
        );
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_from_length() {
        assert_eq!(DigestAlgorithm::from_hex_len(32).unwrap(), DigestAlgorithm::Md5);
        assert_eq!(DigestAlgorithm::from_hex_len(40).unwrap(), DigestAlgorithm::Sha1);
        assert_eq!(DigestAlgorithm::from_hex_len(64).unwrap(), DigestAlgorithm::Sha256);
        assert_eq!(DigestAlgorithm::from_hex_len(128).unwrap(), DigestAlgorithm::Sha512);

        for bad in [0, 31, 33, 41, 63, 65, 127, 129] {
            assert!(matches!(
                DigestAlgorithm::from_hex_len(bad),
                Err(BuildError::DigestLength(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_verify_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        tokio::fs::write(&path, b"abc").await.unwrap();

        // published test vectors for "abc"
        assert!(verify(&path, "900150983cd24fb0d6963f7d28e17f72").await.unwrap());
        assert!(verify(&path, "a9993e364706816aba3e25717850c26c9cd0d89d").await.unwrap());
        assert!(verify(
            &path,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        )
        .await
        .unwrap());
    }

    #[tokio::test]
    async fn test_corruption_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        tokio::fs::write(&path, b"abd").await.unwrap();

        assert!(!verify(
            &path,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        )
        .await
        .unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");

        let err = verify(&path, "900150983cd24fb0d6963f7d28e17f72")
            .await
            .unwrap_err();
        match err {
            BuildError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
