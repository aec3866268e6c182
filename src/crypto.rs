//! Key handling and the authenticated cipher used for encrypted
//! reference files.
//!
//! Keys are derived from a fresh random UUID: its 32 hex characters are
//! taken directly as 32 key bytes, and the key file stores the standard
//! base64 encoding of those bytes (44 ASCII characters, no trailing
//! newline). Encrypted output is a token of the form `nonce || ciphertext`,
//! where the ciphertext carries the Poly1305 authentication tag.

use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use std::fmt;
use uuid::Uuid;

/// Raw key length in bytes.
pub const KEY_LEN: usize = 32;

/// XChaCha20-Poly1305 nonce length in bytes, prepended to every token.
const NONCE_LEN: usize = 24;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Malformed key material (expected base64 of {} bytes)", KEY_LEN)]
    MalformedKey,
    #[error("Encrypted data too short to contain a nonce")]
    TruncatedToken,
    #[error("Encryption failed")]
    Encryption,
    #[error("Decryption failed: wrong key or tampered data")]
    Decryption,
}

/// Symmetric key material for an encrypted reference file.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    material: [u8; KEY_LEN],
}

impl Key {
    /// Generates a fresh key from a random UUID (128 bits of randomness).
    pub fn generate() -> Key {
        let seed = Uuid::new_v4().simple().to_string();
        let mut material = [0u8; KEY_LEN];
        material.copy_from_slice(seed.as_bytes());
        Key { material }
    }

    /// Parses key-file content: base64 text decoding to exactly [`KEY_LEN`]
    /// bytes. A trailing newline is tolerated.
    pub fn from_encoded(raw: &[u8]) -> Result<Key, CryptoError> {
        let text = std::str::from_utf8(raw).map_err(|_| CryptoError::MalformedKey)?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(text.trim_end())
            .map_err(|_| CryptoError::MalformedKey)?;
        let material: [u8; KEY_LEN] = decoded
            .try_into()
            .map_err(|_| CryptoError::MalformedKey)?;
        Ok(Key { material })
    }

    /// The key-file representation.
    pub fn encoded(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.material)
    }

    fn material(&self) -> &[u8; KEY_LEN] {
        &self.material
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key bytes stay out of logs and panic messages.
        f.write_str("Key(..)")
    }
}

/// An authenticated symmetric scheme. Decryption must fail for a wrong key
/// or a modified token, never silently return garbage.
pub trait Cipher {
    fn generate_key(&self) -> Key;
    fn encrypt(&self, key: &Key, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;
    fn decrypt(&self, key: &Key, token: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// XChaCha20-Poly1305 with a random nonce per token.
#[derive(Debug, Default, Clone, Copy)]
pub struct XChaCha;

impl Cipher for XChaCha {
    fn generate_key(&self) -> Key {
        Key::generate()
    }

    fn encrypt(&self, key: &Key, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = XChaCha20Poly1305::new(key.material().into());
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CryptoError::Encryption)?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(nonce.as_slice());
        token.extend_from_slice(&ciphertext);
        Ok(token)
    }

    fn decrypt(&self, key: &Key, token: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if token.len() < NONCE_LEN {
            return Err(CryptoError::TruncatedToken);
        }
        let (nonce, ciphertext) = token.split_at(NONCE_LEN);

        let cipher = XChaCha20Poly1305::new(key.material().into());
        cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decryption)
    }
}
