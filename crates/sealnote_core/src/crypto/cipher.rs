//! Per-note authenticated encryption.
//!
//! # Responsibility
//! - Turn one plaintext note body into a printable, self-contained blob.
//! - Open such a blob again, failing loudly on any mismatch.
//!
//! # Invariants
//! - Blob bytes are `version || nonce || ciphertext+tag`, URL-safe base64.
//! - A fresh random nonce is drawn for every `seal` call, so equal
//!   plaintexts never produce equal blobs.
//! - Authentication failures are reported, never masked.

use crate::crypto::key::KeyMaterial;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::string::FromUtf8Error;

/// Leading byte identifying the blob layout.
pub const BLOB_VERSION: u8 = 0x01;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const MIN_BLOB_LEN: usize = 1 + NONCE_LEN + TAG_LEN;

pub type CipherResult<T> = Result<T, CipherError>;

/// Encryption/decryption failures.
#[derive(Debug)]
pub enum CipherError {
    /// Key material has a length AES-256 cannot use.
    InvalidKeyLength(usize),
    /// Blob text is not valid base64.
    Encoding(base64::DecodeError),
    /// Decoded blob is shorter than version + nonce + tag.
    Truncated(usize),
    UnsupportedVersion(u8),
    /// Tag check failed: wrong key, corruption or tampering.
    Authentication,
    /// Sealing failed inside the AEAD implementation.
    Seal,
    /// Plaintext authenticated but is not UTF-8.
    Utf8(FromUtf8Error),
}

impl Display for CipherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKeyLength(len) => {
                write!(f, "key material has unusable length {len}; expected 32 bytes")
            }
            Self::Encoding(err) => write!(f, "ciphertext blob is not valid base64: {err}"),
            Self::Truncated(len) => write!(f, "ciphertext blob too short ({len} bytes)"),
            Self::UnsupportedVersion(version) => {
                write!(f, "unsupported ciphertext blob version {version:#04x}")
            }
            Self::Authentication => write!(f, "ciphertext failed authentication"),
            Self::Seal => write!(f, "failed to encrypt note text"),
            Self::Utf8(err) => write!(f, "decrypted note text is not UTF-8: {err}"),
        }
    }
}

impl Error for CipherError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encoding(err) => Some(err),
            Self::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for CipherError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Encoding(value)
    }
}

impl From<FromUtf8Error> for CipherError {
    fn from(value: FromUtf8Error) -> Self {
        Self::Utf8(value)
    }
}

/// Seals and opens note text with one key.
///
/// The AES context is built per call so that unusable key material is
/// reported at encrypt/decrypt time rather than when the key is loaded.
#[derive(Debug, Clone)]
pub struct NoteCipher {
    key: KeyMaterial,
}

impl NoteCipher {
    pub fn new(key: KeyMaterial) -> Self {
        Self { key }
    }

    /// Encrypts `plaintext` into a printable blob.
    pub fn seal(&self, plaintext: &str) -> CipherResult<String> {
        let aead = self.aead()?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = aead
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Seal)?;

        let mut blob = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
        blob.push(BLOB_VERSION);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(URL_SAFE.encode(blob))
    }

    /// Decrypts a blob produced by [`NoteCipher::seal`] with the same key.
    pub fn open(&self, blob: &str) -> CipherResult<String> {
        let aead = self.aead()?;
        let bytes = URL_SAFE.decode(blob.trim())?;
        if bytes.len() < MIN_BLOB_LEN {
            return Err(CipherError::Truncated(bytes.len()));
        }
        if bytes[0] != BLOB_VERSION {
            return Err(CipherError::UnsupportedVersion(bytes[0]));
        }

        let (nonce, sealed) = bytes[1..].split_at(NONCE_LEN);
        let plaintext = aead
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::Authentication)?;
        Ok(String::from_utf8(plaintext)?)
    }

    fn aead(&self) -> CipherResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(self.key.as_bytes())
            .map_err(|_| CipherError::InvalidKeyLength(self.key.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CipherError, NoteCipher, BLOB_VERSION};
    use crate::crypto::key::KeyMaterial;
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine;

    fn cipher() -> NoteCipher {
        NoteCipher::new(KeyMaterial::generate())
    }

    #[test]
    fn open_reverses_seal() {
        let cipher = cipher();
        for text in ["hello", "multi\nline  note", "юникод ✓"] {
            let blob = cipher.seal(text).unwrap();
            assert_eq!(cipher.open(&blob).unwrap(), text);
        }
    }

    #[test]
    fn sealing_is_non_deterministic() {
        let cipher = cipher();
        let first = cipher.seal("same").unwrap();
        let second = cipher.seal("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn blob_is_url_safe_base64_with_version_prefix() {
        let blob = cipher().seal("x").unwrap();
        assert!(blob
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')));
        let raw = URL_SAFE.decode(&blob).unwrap();
        assert_eq!(raw[0], BLOB_VERSION);
    }

    #[test]
    fn open_with_other_key_fails_authentication() {
        let blob = cipher().seal("secret").unwrap();
        let err = cipher().open(&blob).unwrap_err();
        assert!(matches!(err, CipherError::Authentication));
    }

    #[test]
    fn flipped_byte_fails_authentication() {
        let cipher = cipher();
        let mut raw = URL_SAFE.decode(cipher.seal("secret").unwrap()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let err = cipher.open(&URL_SAFE.encode(raw)).unwrap_err();
        assert!(matches!(err, CipherError::Authentication));
    }

    #[test]
    fn malformed_blobs_are_rejected() {
        let cipher = cipher();
        assert!(matches!(
            cipher.open("not base64 !!").unwrap_err(),
            CipherError::Encoding(_)
        ));
        assert!(matches!(
            cipher.open(&URL_SAFE.encode([BLOB_VERSION, 1, 2])).unwrap_err(),
            CipherError::Truncated(3)
        ));
        assert!(matches!(
            cipher.open(&URL_SAFE.encode([0x7f; 40])).unwrap_err(),
            CipherError::UnsupportedVersion(0x7f)
        ));
    }

    #[test]
    fn short_key_fails_on_use() {
        let cipher = NoteCipher::new(KeyMaterial::from_bytes(b"too short".to_vec()));
        assert!(matches!(
            cipher.seal("x").unwrap_err(),
            CipherError::InvalidKeyLength(9)
        ));
    }
}
