//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! This module turns a master secret and a per-user salt into the 32-byte
//! vault key. The derivation is iterated to make offline guessing expensive
//! and is fully deterministic, which is what lets a locked vault be unlocked
//! again later.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use super::random::random_array;
use crate::error::{Result, VaultError};

/// Default PBKDF2 iteration count.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Hard floor for explicitly configured iteration counts.
pub const MIN_KDF_ITERATIONS: u32 = 1_000;

/// Length of the vault key in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Length of the per-user salt in bytes.
pub const SALT_LENGTH: usize = 32;

/// Per-user random salt, generated once at vault creation.
///
/// Not secret: it is persisted next to the user's account record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Generate a fresh salt from the secure random source.
    pub fn generate() -> Result<Self> {
        Ok(Self(random_array::<SALT_LENGTH>()?))
    }

    /// Wrap salt bytes loaded from storage.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a salt from an arbitrary slice, rejecting the wrong length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SALT_LENGTH] = bytes.try_into().map_err(|_| {
            VaultError::InvalidInput(format!(
                "Salt must be exactly {} bytes (got {})",
                SALT_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

/// The symmetric key that encrypts credential records.
///
/// This type ensures that key material is securely zeroized from memory
/// when dropped. It is never serialized and its `Debug` output is redacted.
#[derive(Clone, ZeroizeOnDrop)]
pub struct VaultKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; KEY_LENGTH],
}

impl VaultKey {
    /// Create a VaultKey from raw bytes.
    ///
    /// # Security
    ///
    /// The caller is responsible for ensuring the bytes come from a secure source.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// PBKDF2 cost parameters.
///
/// `KdfParams::default()` is always [`DEFAULT_KDF_ITERATIONS`]. A lower cost
/// can only be obtained through [`KdfParams::with_iterations`], which logs a
/// warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_KDF_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Explicitly choose an iteration count.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Config` below [`MIN_KDF_ITERATIONS`].
    pub fn with_iterations(iterations: u32) -> Result<Self> {
        if iterations < MIN_KDF_ITERATIONS {
            return Err(VaultError::Config(format!(
                "KDF iterations must be at least {} (got {})",
                MIN_KDF_ITERATIONS, iterations
            )));
        }
        if iterations < DEFAULT_KDF_ITERATIONS {
            tracing::warn!(
                iterations,
                default = DEFAULT_KDF_ITERATIONS,
                "KDF iteration count lowered below default"
            );
        }
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// Derive the vault key from a master secret.
///
/// # Arguments
///
/// * `secret` - The master secret (never logged or retained)
/// * `salt` - The user's persisted salt
/// * `params` - PBKDF2 cost parameters
///
/// # Security
///
/// - Same secret + salt + iterations always produces the same key
/// - Different salt produces a different key (salt must be stored per user)
/// - The output is written straight into the zeroize-on-drop key buffer
///
/// # Examples
///
/// ```
/// use vault_core::crypto::{derive_key, KdfParams, Salt};
///
/// let salt = Salt::from_bytes([7u8; 32]);
/// let params = KdfParams::with_iterations(1_000).unwrap();
/// let key = derive_key("my-master-secret", &salt, &params).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(secret: &str, salt: &Salt, params: &KdfParams) -> Result<VaultKey> {
    if secret.is_empty() {
        return Err(VaultError::InvalidInput(
            "Master secret cannot be empty".to_string(),
        ));
    }

    tracing::debug!(iterations = params.iterations, "deriving vault key");

    let mut key = VaultKey::from_bytes([0u8; KEY_LENGTH]);
    pbkdf2_hmac::<Sha256>(
        secret.as_bytes(),
        salt.as_bytes(),
        params.iterations,
        &mut key.key,
    );

    Ok(key)
}
