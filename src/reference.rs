//! Persistence of the reference manifest: either a plaintext CSV file, or
//! an encrypted envelope paired with a key file. Which form applies is
//! decided once, when the [`Reference`] is constructed, so the rest of the
//! code never re-branches on "was a key supplied".

use crate::crypto::{Cipher, CryptoError, Key};
use crate::manifest::{Manifest, ManifestError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixed reference file name.
pub const REF_FILENAME: &str = "srccheck.ref";
/// Fixed key file name, written only in encrypted mode.
pub const KEY_FILENAME: &str = "srccheck.key";

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Malformed reference file: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("Malformed reference envelope: {0}")]
    Envelope(#[from] bincode::Error),
    #[error("Unsupported reference envelope version: {0}")]
    UnsupportedVersion(u32),
}

/// On-disk wrapper for an encrypted manifest. The token bytes are not
/// text-safe, so they are carried in a binary serialization envelope
/// rather than written directly.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    token: Vec<u8>,
}

impl Envelope {
    const SUPPORTED_VERSION: u32 = 1;
}

/// A persisted reference manifest, in one of its two physical forms.
///
/// The variant is selected at the API boundary: `generate` picks based on
/// the encrypt flag, `check` based on whether a key file was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Plaintext { ref_file: PathBuf },
    Encrypted { ref_file: PathBuf, key_file: PathBuf },
}

impl Reference {
    /// Selects the form from the presence of a key file, the `check`-side
    /// boundary rule.
    pub fn select(ref_file: PathBuf, key_file: Option<PathBuf>) -> Reference {
        match key_file {
            None => Reference::Plaintext { ref_file },
            Some(key_file) => Reference::Encrypted { ref_file, key_file },
        }
    }

    /// The output pair for a `generate` run: fixed file names inside `dir`.
    pub fn in_dir(dir: &Path, encrypt: bool) -> Reference {
        if encrypt {
            Reference::Encrypted {
                ref_file: dir.join(REF_FILENAME),
                key_file: dir.join(KEY_FILENAME),
            }
        } else {
            Reference::Plaintext {
                ref_file: dir.join(REF_FILENAME),
            }
        }
    }

    pub fn ref_file(&self) -> &Path {
        match self {
            Reference::Plaintext { ref_file } => ref_file,
            Reference::Encrypted { ref_file, .. } => ref_file,
        }
    }

    pub fn key_file(&self) -> Option<&Path> {
        match self {
            Reference::Plaintext { .. } => None,
            Reference::Encrypted { key_file, .. } => Some(key_file),
        }
    }

    /// Loads the reference manifest, decrypting first for the encrypted
    /// form. Decryption failures (wrong key, tampered token) propagate
    /// unchanged from the cipher.
    pub fn load(&self, cipher: &dyn Cipher) -> Result<Manifest, ReferenceError> {
        match self {
            Reference::Plaintext { ref_file } => {
                let content = read_to_string(ref_file)?;
                Ok(Manifest::from_csv(&content)?)
            }
            Reference::Encrypted { ref_file, key_file } => {
                let bytes = read(ref_file)?;

                // Check the version on its own first: a future envelope
                // layout should report as unsupported, not as corrupt.
                let version: u32 = bincode::deserialize(&bytes)?;
                if version != Envelope::SUPPORTED_VERSION {
                    return Err(ReferenceError::UnsupportedVersion(version));
                }
                let envelope: Envelope = bincode::deserialize(&bytes)?;

                let key = Key::from_encoded(&read(key_file)?)?;
                let payload = cipher.decrypt(&key, &envelope.token)?;
                Ok(Manifest::from_json(&payload)?)
            }
        }
    }

    /// Persists the manifest. For the encrypted form a fresh key is
    /// generated and written first, then the encrypted reference file; both
    /// writes are atomic.
    pub fn store(&self, manifest: &Manifest, cipher: &dyn Cipher) -> Result<(), ReferenceError> {
        match self {
            Reference::Plaintext { ref_file } => {
                write_atomic(ref_file, manifest.to_csv().as_bytes())
            }
            Reference::Encrypted { ref_file, key_file } => {
                let key = cipher.generate_key();
                write_atomic(key_file, key.encoded().as_bytes())?;

                let token = cipher.encrypt(&key, &manifest.to_json()?)?;
                let envelope = Envelope {
                    version: Envelope::SUPPORTED_VERSION,
                    token,
                };
                write_atomic(ref_file, &bincode::serialize(&envelope)?)
            }
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ReferenceError> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ReferenceError::PermissionDenied(path.to_path_buf())
        } else {
            ReferenceError::Io(e)
        }
    })
}

fn read_to_string(path: &Path) -> Result<String, ReferenceError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ReferenceError::PermissionDenied(path.to_path_buf())
        } else {
            ReferenceError::Io(e)
        }
    })
}

/// Writes to a temporary file in the destination directory, fsyncs it, then
/// atomically renames it into place.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ReferenceError> {
    use std::io::Write;

    debug!("Writing {}", path.display());

    let parent = path.parent().unwrap_or(Path::new("."));

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ReferenceError::PermissionDenied(parent.to_path_buf())
        } else {
            ReferenceError::Io(e)
        }
    })?;

    temp_file.write_all(content).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ReferenceError::PermissionDenied(path.to_path_buf())
        } else {
            ReferenceError::Io(e)
        }
    })?;

    temp_file.as_file().sync_all().map_err(ReferenceError::Io)?;

    temp_file.persist(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::PermissionDenied {
            ReferenceError::PermissionDenied(path.to_path_buf())
        } else {
            ReferenceError::Io(e.error)
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::XChaCha;
    use tempfile::TempDir;

    fn sample() -> Manifest {
        let mut manifest = Manifest::new();
        manifest.insert("a.txt", "5d41402abc4b2a76b9719d911017c592");
        manifest.insert("b.txt", "7d793037a0760186574b0282f2f435e7");
        manifest
    }

    #[test]
    fn test_select_plaintext_without_key() {
        let reference = Reference::select(PathBuf::from("r.ref"), None);

        assert_eq!(
            reference,
            Reference::Plaintext {
                ref_file: PathBuf::from("r.ref")
            }
        );
    }

    #[test]
    fn test_select_encrypted_with_key() {
        let reference = Reference::select(PathBuf::from("r.ref"), Some(PathBuf::from("r.key")));

        assert_eq!(
            reference,
            Reference::Encrypted {
                ref_file: PathBuf::from("r.ref"),
                key_file: PathBuf::from("r.key"),
            }
        );
    }

    #[test]
    fn test_in_dir_uses_fixed_names() {
        let dir = Path::new("/out");

        let plaintext = Reference::in_dir(dir, false);
        let encrypted = Reference::in_dir(dir, true);

        assert_eq!(plaintext.ref_file(), Path::new("/out/srccheck.ref"));
        assert_eq!(plaintext.key_file(), None);
        assert_eq!(encrypted.ref_file(), Path::new("/out/srccheck.ref"));
        assert_eq!(encrypted.key_file(), Some(Path::new("/out/srccheck.key")));
    }

    #[test]
    fn test_plaintext_store_and_load() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), false);
        let manifest = sample();

        reference.store(&manifest, &XChaCha).unwrap();
        let loaded = reference.load(&XChaCha).unwrap();

        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_plaintext_store_writes_csv() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), false);

        reference.store(&sample(), &XChaCha).unwrap();

        let content = std::fs::read_to_string(reference.ref_file()).unwrap();
        assert_eq!(
            content,
            "a.txt,5d41402abc4b2a76b9719d911017c592\n\
             b.txt,7d793037a0760186574b0282f2f435e7\n"
        );
    }

    #[test]
    fn test_encrypted_store_and_load() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), true);
        let manifest = sample();

        reference.store(&manifest, &XChaCha).unwrap();
        let loaded = reference.load(&XChaCha).unwrap();

        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_encrypted_store_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), true);

        reference.store(&sample(), &XChaCha).unwrap();

        assert!(reference.ref_file().exists());
        let key_bytes = std::fs::read(reference.key_file().unwrap()).unwrap();
        assert_eq!(key_bytes.len(), 44);
    }

    #[test]
    fn test_encrypted_reference_is_not_plaintext() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), true);
        let manifest = sample();

        reference.store(&manifest, &XChaCha).unwrap();

        let bytes = std::fs::read(reference.ref_file()).unwrap();
        let haystack = String::from_utf8_lossy(&bytes);
        assert!(!haystack.contains("a.txt"));
        assert!(!haystack.contains("5d41402abc4b2a76b9719d911017c592"));
    }

    #[test]
    fn test_load_missing_plaintext_is_io_error() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), false);

        let result = reference.load(&XChaCha);

        match result {
            Err(ReferenceError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("Expected IO error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_with_wrong_key_fails() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), true);
        reference.store(&sample(), &XChaCha).unwrap();

        // Overwrite the key file with a fresh key.
        let other_key = Key::generate();
        std::fs::write(reference.key_file().unwrap(), other_key.encoded()).unwrap();

        let result = reference.load(&XChaCha);

        assert!(matches!(
            result,
            Err(ReferenceError::Crypto(CryptoError::Decryption))
        ));
    }

    #[test]
    fn test_load_corrupt_envelope_fails() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), true);
        reference.store(&sample(), &XChaCha).unwrap();

        std::fs::write(reference.ref_file(), b"\x01").unwrap();

        let result = reference.load(&XChaCha);

        assert!(matches!(result, Err(ReferenceError::Envelope(_))));
    }

    #[test]
    fn test_load_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), true);
        reference.store(&sample(), &XChaCha).unwrap();

        let envelope = Envelope {
            version: 999,
            token: vec![1, 2, 3],
        };
        std::fs::write(reference.ref_file(), bincode::serialize(&envelope).unwrap()).unwrap();

        let result = reference.load(&XChaCha);

        match result {
            Err(ReferenceError::UnsupportedVersion(999)) => {}
            other => panic!("Expected UnsupportedVersion(999), got {other:?}"),
        }
    }

    #[test]
    fn test_version_checked_before_token_shape() {
        // A future version whose remaining bytes do not even decode as an
        // Envelope must still report as unsupported, not as corrupt.
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), true);

        let mut bytes = bincode::serialize(&999u32).unwrap();
        bytes.extend_from_slice(&[0xff, 0xff, 0xff]);
        std::fs::write(reference.ref_file(), &bytes).unwrap();

        let result = reference.load(&XChaCha);

        match result {
            Err(ReferenceError::UnsupportedVersion(999)) => {}
            other => panic!("Expected UnsupportedVersion(999), got {other:?}"),
        }
    }

    #[test]
    fn test_store_overwrites_previous_reference() {
        let dir = TempDir::new().unwrap();
        let reference = Reference::in_dir(dir.path(), false);

        reference.store(&sample(), &XChaCha).unwrap();
        let mut updated = Manifest::new();
        updated.insert("c.txt", "cccc");
        reference.store(&updated, &XChaCha).unwrap();

        let loaded = reference.load(&XChaCha).unwrap();
        assert_eq!(loaded, updated);
    }
}
