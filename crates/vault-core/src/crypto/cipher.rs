//! Per-record authenticated encryption.
//!
//! Each credential secret is encrypted on its own into a self-contained
//! text blob:
//!
//! ```text
//! base64( version:1 || nonce:12 || AES-256-GCM ciphertext+tag )
//! ```
//!
//! The nonce is drawn fresh from the secure random source for every call,
//! so encrypting the same plaintext twice never yields the same blob.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::kdf::VaultKey;
use super::random::random_array;
use crate::error::{Result, VaultError};

/// Current blob format version.
const FORMAT_VERSION: u8 = 1;

/// AES-GCM nonce length in bytes.
const NONCE_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes.
const TAG_LENGTH: usize = 16;

const HEADER_LENGTH: usize = 1 + NONCE_LENGTH;

/// Non-sensitive reason code attached to a decryption failure.
///
/// Callers should treat every variant the same way ("decryption failed");
/// the distinction exists for local diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptFailure {
    /// Not valid base64, or too short to hold a header and tag
    Malformed,
    /// Unknown format version byte
    UnsupportedVersion,
    /// Tag check failed: wrong key or tampered blob
    Authentication,
    /// Decrypted bytes are not UTF-8
    InvalidUtf8,
}

impl DecryptFailure {
    pub fn code(&self) -> &'static str {
        match self {
            DecryptFailure::Malformed => "malformed",
            DecryptFailure::UnsupportedVersion => "unsupported_version",
            DecryptFailure::Authentication => "authentication",
            DecryptFailure::InvalidUtf8 => "invalid_utf8",
        }
    }
}

/// An encrypted credential secret, as stored by the persistence layer.
///
/// Opaque to everything except [`decrypt`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedRecord(String);

impl EncryptedRecord {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for EncryptedRecord {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EncryptedRecord {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EncryptedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EncryptedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptedRecord")
            .field(&format_args!("{} chars", self.0.len()))
            .finish()
    }
}

fn cipher_for(key: &VaultKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| VaultError::Crypto("Invalid vault key length".to_string()))
}

/// Encrypt a single secret string under the vault key.
///
/// # Errors
///
/// Returns `VaultError::RandomSourceUnavailable` if no nonce can be drawn,
/// or `VaultError::Crypto` if the cipher itself fails.
///
/// # Examples
///
/// ```
/// use vault_core::crypto::{decrypt, encrypt, VaultKey};
///
/// let key = VaultKey::from_bytes([42u8; 32]);
/// let blob = encrypt("hunter2", &key).unwrap();
/// assert_eq!(decrypt(&blob, &key).unwrap().as_str(), "hunter2");
/// ```
pub fn encrypt(plaintext: &str, key: &VaultKey) -> Result<EncryptedRecord> {
    let cipher = cipher_for(key)?;
    let nonce_bytes = random_array::<NONCE_LENGTH>()?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|_| VaultError::Crypto("Record encryption failed".to_string()))?;

    let mut payload = Vec::with_capacity(HEADER_LENGTH + ciphertext.len());
    payload.push(FORMAT_VERSION);
    payload.extend_from_slice(&nonce_bytes);
    payload.extend_from_slice(&ciphertext);

    Ok(EncryptedRecord(STANDARD.encode(payload)))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// # Errors
///
/// Returns `VaultError::DecryptionFailed` if:
/// - The blob is not valid base64 or is truncated
/// - The format version is unknown
/// - The key does not match or the blob was tampered with
/// - The recovered bytes are not UTF-8
pub fn decrypt(blob: &EncryptedRecord, key: &VaultKey) -> Result<Zeroizing<String>> {
    let payload = STANDARD
        .decode(blob.as_str().trim())
        .map_err(|_| fail(DecryptFailure::Malformed))?;

    if payload.len() < HEADER_LENGTH + TAG_LENGTH {
        return Err(fail(DecryptFailure::Malformed));
    }
    if payload[0] != FORMAT_VERSION {
        return Err(fail(DecryptFailure::UnsupportedVersion));
    }

    let (nonce_bytes, ciphertext) = payload[1..].split_at(NONCE_LENGTH);
    let cipher = cipher_for(key)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| fail(DecryptFailure::Authentication))?;

    String::from_utf8(plaintext)
        .map(Zeroizing::new)
        .map_err(|err| {
            // Drop the rejected bytes through a zeroizing buffer.
            let _ = Zeroizing::new(err.into_bytes());
            fail(DecryptFailure::InvalidUtf8)
        })
}

fn fail(reason: DecryptFailure) -> VaultError {
    tracing::debug!(reason = reason.code(), "record decryption failed");
    VaultError::DecryptionFailed(reason)
}
