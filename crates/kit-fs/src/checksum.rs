//! Checksum calculation and verification
//!
//! Digests are plain lowercase hex strings. Verification compares
//! case-insensitively so digests copied from tools that print uppercase hex
//! still match.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Chunk size used when hashing files.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    #[default]
    Sha256,
    Sha1,
    Md5,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
        }
    }

    /// Length of a hex digest produced by this algorithm.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha1 => 40,
            Self::Md5 => 32,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "md5" => Ok(Self::Md5),
            other => Err(Error::UnsupportedAlgorithm {
                name: other.to_string(),
            }),
        }
    }
}

impl serde::Serialize for Algorithm {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Algorithm {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn digest_bytes<D: Digest>(content: &[u8]) -> String
where
    sha2::digest::Output<D>: fmt::LowerHex,
{
    format!("{:x}", D::digest(content))
}

fn digest_reader<D: Digest, R: Read>(mut reader: R) -> std::io::Result<String>
where
    sha2::digest::Output<D>: fmt::LowerHex,
{
    let mut hasher = D::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the digest of in-memory content as lowercase hex.
pub fn calculate(content: &[u8], algorithm: Algorithm) -> String {
    match algorithm {
        Algorithm::Sha256 => digest_bytes::<Sha256>(content),
        Algorithm::Sha1 => digest_bytes::<Sha1>(content),
        Algorithm::Md5 => digest_bytes::<Md5>(content),
    }
}

/// Compute the digest of a file, reading it in [`CHUNK_SIZE`] chunks.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn calculate_file(path: &Path, algorithm: Algorithm) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let digest = match algorithm {
        Algorithm::Sha256 => digest_reader::<Sha256, _>(file),
        Algorithm::Sha1 => digest_reader::<Sha1, _>(file),
        Algorithm::Md5 => digest_reader::<Md5, _>(file),
    };
    digest.map_err(|e| Error::io(path, e))
}

/// Check content against an expected digest, ignoring hex case.
pub fn verify(content: &[u8], expected: &str, algorithm: Algorithm) -> bool {
    calculate(content, algorithm).eq_ignore_ascii_case(expected.trim())
}

/// Like [`verify`], but fails with both digests in the error.
pub fn verify_strict(
    content: &[u8],
    expected: &str,
    algorithm: Algorithm,
    subject: &str,
) -> Result<()> {
    let actual = calculate(content, algorithm);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            subject: subject.to_string(),
            expected: expected.trim().to_string(),
            actual,
        })
    }
}

/// Verify a file on disk against an expected digest.
pub fn verify_file(path: &Path, expected: &str, algorithm: Algorithm) -> Result<()> {
    let actual = calculate_file(path, algorithm)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            subject: path.display().to_string(),
            expected: expected.trim().to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        Algorithm::Sha256,
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    )]
    #[case(Algorithm::Sha1, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed")]
    #[case(Algorithm::Md5, "5eb63bbbe01eeed093cb22bb8f5acdc3")]
    fn known_digests(#[case] algorithm: Algorithm, #[case] expected: &str) {
        let digest = calculate(b"hello world", algorithm);
        assert_eq!(digest, expected);
        assert_eq!(digest.len(), algorithm.hex_len());
    }

    #[test]
    fn verify_ignores_case() {
        let digest = calculate(b"test", Algorithm::Sha256).to_uppercase();
        assert!(verify(b"test", &digest, Algorithm::Sha256));
    }

    #[test]
    fn verify_strict_reports_both_digests() {
        let err = verify_strict(b"content", "deadbeef", Algorithm::Sha256, "rules.md").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("deadbeef"));
        assert!(message.contains(&calculate(b"content", Algorithm::Sha256)));
        assert!(message.contains("rules.md"));
    }

    #[test]
    fn file_digest_matches_content_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "hello world").unwrap();

        for algorithm in [Algorithm::Sha256, Algorithm::Sha1, Algorithm::Md5] {
            assert_eq!(
                calculate_file(&path, algorithm).unwrap(),
                calculate(b"hello world", algorithm)
            );
        }
    }

    #[test]
    fn file_digest_spans_multiple_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large.bin");
        let content: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        assert_eq!(
            calculate_file(&path, Algorithm::Sha256).unwrap(),
            calculate(&content, Algorithm::Sha256)
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = calculate_file(Path::new("/nonexistent/file"), Algorithm::Md5).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn algorithm_parses_case_insensitively() {
        assert_eq!("SHA256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("md5".parse::<Algorithm>().unwrap(), Algorithm::Md5);
        assert!("crc32".parse::<Algorithm>().is_err());
    }
}
