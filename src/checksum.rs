use md5::Md5;
use sha1::Sha1;
use sha2::digest::Output;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const CHUNK_SIZE: usize = 8192;

#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
}

/// The checksum algorithms a manifest can be built with.
///
/// `Md5` is the default and matches reference files produced by older
/// tooling. CRC-32 is not cryptographic; it is retained for cheap
/// corruption checks on trusted media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    Crc32,
    #[default]
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown hash algorithm: {0} (expected crc32, md5, sha1, sha256 or sha512)")]
pub struct ParseAlgorithmError(String);

impl FromStr for HashAlgorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crc32" => Ok(HashAlgorithm::Crc32),
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Crc32 => "crc32",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

/// Computes the checksum of a file's full contents as a lowercase hex string.
///
/// # Behavior
/// - Reads the file in chunks, so memory use is independent of file size
/// - Digest algorithms produce their usual hex digest; CRC-32 is rendered
///   as 8 zero-padded hex characters
///
/// # Errors
/// - `ChecksumError::Io`: File doesn't exist or other I/O errors
/// - `ChecksumError::PermissionDenied`: Insufficient permissions to read the file
pub fn checksum_file(path: &Path, algorithm: HashAlgorithm) -> Result<String, ChecksumError> {
    info!("Checksumming {}", path.display());

    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ChecksumError::PermissionDenied(path.to_path_buf())
        } else {
            ChecksumError::Io(e)
        }
    })?;

    let digest = match algorithm {
        HashAlgorithm::Crc32 => crc32_reader(&mut file)?,
        HashAlgorithm::Md5 => format!("{:x}", digest_reader::<Md5>(&mut file)?),
        HashAlgorithm::Sha1 => format!("{:x}", digest_reader::<Sha1>(&mut file)?),
        HashAlgorithm::Sha256 => format!("{:x}", digest_reader::<Sha256>(&mut file)?),
        HashAlgorithm::Sha512 => format!("{:x}", digest_reader::<Sha512>(&mut file)?),
    };

    debug!("{} checksum of {} is {}", algorithm, path.display(), digest);

    Ok(digest)
}

fn digest_reader<D: Digest>(reader: &mut impl Read) -> Result<Output<D>, ChecksumError> {
    let mut hasher = D::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(ChecksumError::Io)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

fn crc32_reader(reader: &mut impl Read) -> Result<String, ChecksumError> {
    let mut hasher = crc32fast::Hasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(ChecksumError::Io)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:08x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &[u8]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_md5_known_digest() {
        let temp_file = file_with(b"hello");

        let digest = checksum_file(temp_file.path(), HashAlgorithm::Md5).unwrap();

        assert_eq!(digest, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_sha1_known_digest() {
        let temp_file = file_with(b"hello");

        let digest = checksum_file(temp_file.path(), HashAlgorithm::Sha1).unwrap();

        assert_eq!(digest, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn test_sha256_known_digest() {
        let temp_file = file_with(b"Hello, world!");

        let digest = checksum_file(temp_file.path(), HashAlgorithm::Sha256).unwrap();

        assert_eq!(
            digest,
            "315f5bdb76d078c43b8ac0064e4a0164612b1fce77c869345bfc94c75894edd3"
        );
    }

    #[test]
    fn test_sha512_known_digest() {
        let temp_file = file_with(b"hello");

        let digest = checksum_file(temp_file.path(), HashAlgorithm::Sha512).unwrap();

        assert_eq!(
            digest,
            "9b71d224bd62f3785d96d46ad3ea3d73319bfbc2890caadae2dff72519673ca7\
             2323c3d99ba5c11d7c7acc6e14b8c5da0c4663475c2e5c3adef46f73bcdec043"
        );
    }

    #[test]
    fn test_crc32_known_digest() {
        let temp_file = file_with(b"hello");

        let digest = checksum_file(temp_file.path(), HashAlgorithm::Crc32).unwrap();

        assert_eq!(digest, "3610a686");
    }

    #[test]
    fn test_crc32_empty_file_is_zero_padded() {
        let temp_file = NamedTempFile::new().unwrap();

        let digest = checksum_file(temp_file.path(), HashAlgorithm::Crc32).unwrap();

        assert_eq!(digest, "00000000");
    }

    #[test]
    fn test_md5_empty_file() {
        let temp_file = NamedTempFile::new().unwrap();

        let digest = checksum_file(temp_file.path(), HashAlgorithm::Md5).unwrap();

        assert_eq!(digest, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_content_spanning_multiple_chunks() {
        // 10000 bytes forces the read loop past a single 8192-byte chunk.
        let temp_file = file_with(&vec![b'a'; 10000]);

        let digest = checksum_file(temp_file.path(), HashAlgorithm::Md5).unwrap();

        assert_eq!(digest, "0d0c9c4db6953fee9e03f528cafd7d3e");
    }

    #[test]
    fn test_checksum_nonexistent_file() {
        let result = checksum_file(Path::new("/nonexistent/file.txt"), HashAlgorithm::Md5);

        match result {
            Err(ChecksumError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected IO error for nonexistent file"),
        }
    }

    #[test]
    fn test_checksum_deterministic() {
        let temp_file = file_with(b"test content");

        let first = checksum_file(temp_file.path(), HashAlgorithm::Sha256).unwrap();
        let second = checksum_file(temp_file.path(), HashAlgorithm::Sha256).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    #[cfg(unix)]
    fn test_checksum_permission_denied() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let temp_file = file_with(b"test content");

        let mut perms = fs::metadata(temp_file.path()).unwrap().permissions();
        perms.set_mode(0o000);
        fs::set_permissions(temp_file.path(), perms).unwrap();

        // Permission bits are not enforced for root (CAP_DAC_OVERRIDE).
        if fs::File::open(temp_file.path()).is_ok() {
            return;
        }

        let result = checksum_file(temp_file.path(), HashAlgorithm::Md5);

        match result {
            Err(ChecksumError::PermissionDenied(path)) => {
                assert_eq!(path, temp_file.path());
            }
            _ => panic!("Expected PermissionDenied error"),
        }
    }

    #[test]
    fn test_algorithm_parse_round_trip() {
        for name in ["crc32", "md5", "sha1", "sha256", "sha512"] {
            let algorithm: HashAlgorithm = name.parse().unwrap();
            assert_eq!(algorithm.to_string(), name);
        }
    }

    #[test]
    fn test_algorithm_parse_is_case_insensitive() {
        assert_eq!(
            "SHA256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256
        );
    }

    #[test]
    fn test_algorithm_parse_rejects_unknown_names() {
        let err = "sha3".parse::<HashAlgorithm>().unwrap_err();
        assert!(err.to_string().contains("sha3"));
    }

    #[test]
    fn test_default_algorithm_is_md5() {
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Md5);
    }
}
