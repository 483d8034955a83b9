//! Master-secret verification.
//!
//! Produces a one-way hash of the master secret so the device can answer
//! "is this the right master password?" without touching the vault key.
//! Every new hash gets its own random salt, stored inside the hash string.
//! PBKDF2 runs over a domain-separation prefix plus that salt, so the result
//! is independent of the vault key even if the salt bytes were to collide.
//! For a given salt the hash is deterministic.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<base64 salt>$<base64 digest>`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::kdf::{DEFAULT_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use super::random::random_array;
use crate::error::{Result, VaultError};

const SCHEME: &str = "pbkdf2-sha256";

/// Domain-separation prefix for verifier salts.
const VERIFIER_DOMAIN: &[u8] = b"vault-core/master-secret-verifier/v1";

/// Random salt bytes per verifier hash.
pub const VERIFIER_SALT_LENGTH: usize = 16;

const DIGEST_LENGTH: usize = 32;

/// Per-hash verifier salt.
pub type VerifierSalt = [u8; VERIFIER_SALT_LENGTH];

/// Persisted verifier hash of a master secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasterSecretHash(String);

impl MasterSecretHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn parse(&self) -> Result<(u32, VerifierSalt, [u8; DIGEST_LENGTH])> {
        let malformed = || VaultError::InvalidInput("Malformed master secret hash".to_string());

        let mut parts = self.0.splitn(4, '$');
        let scheme = parts.next().ok_or_else(malformed)?;
        let iterations = parts.next().ok_or_else(malformed)?;
        let salt = parts.next().ok_or_else(malformed)?;
        let digest = parts.next().ok_or_else(malformed)?;
        if scheme != SCHEME {
            return Err(malformed());
        }

        let iterations: u32 = iterations.parse().map_err(|_| malformed())?;
        if iterations < MIN_KDF_ITERATIONS {
            return Err(malformed());
        }
        let salt = STANDARD.decode(salt).map_err(|_| malformed())?;
        let salt: VerifierSalt = salt.try_into().map_err(|_| malformed())?;
        let digest = STANDARD.decode(digest).map_err(|_| malformed())?;
        let digest: [u8; DIGEST_LENGTH] = digest.try_into().map_err(|_| malformed())?;
        Ok((iterations, salt, digest))
    }
}

impl From<String> for MasterSecretHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for MasterSecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MasterSecretHash")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Hashes and verifies master secrets.
#[derive(Debug, Clone, Copy)]
pub struct MasterSecretVerifier {
    iterations: u32,
}

impl Default for MasterSecretVerifier {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_KDF_ITERATIONS,
        }
    }
}

impl MasterSecretVerifier {
    /// Verifier with an explicit iteration count for newly created hashes.
    pub fn with_iterations(iterations: u32) -> Result<Self> {
        if iterations < MIN_KDF_ITERATIONS {
            return Err(VaultError::Config(format!(
                "Verifier iterations must be at least {} (got {})",
                MIN_KDF_ITERATIONS, iterations
            )));
        }
        if iterations < DEFAULT_KDF_ITERATIONS {
            tracing::warn!(
                iterations,
                default = DEFAULT_KDF_ITERATIONS,
                "verifier iteration count lowered below default"
            );
        }
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a master secret under a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` for an empty secret, or
    /// `VaultError::RandomSourceUnavailable` if no salt can be drawn.
    pub fn hash(&self, secret: &str) -> Result<MasterSecretHash> {
        self.hash_with_salt(secret, &random_array()?)
    }

    /// Hash a master secret under a given salt. Same inputs always yield the
    /// same output.
    pub fn hash_with_salt(&self, secret: &str, salt: &VerifierSalt) -> Result<MasterSecretHash> {
        if secret.is_empty() {
            return Err(VaultError::InvalidInput(
                "Master secret cannot be empty".to_string(),
            ));
        }
        let digest = digest(secret, salt, self.iterations);
        Ok(MasterSecretHash(format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            STANDARD.encode(salt),
            STANDARD.encode(digest.as_slice())
        )))
    }

    /// Check a candidate secret against a stored hash.
    ///
    /// The salt and iteration count are read from the stored hash, not from
    /// `self`, so hashes written under an older configuration keep verifying.
    pub fn verify(&self, secret: &str, stored: &MasterSecretHash) -> Result<bool> {
        let (iterations, salt, expected) = stored.parse()?;
        if secret.is_empty() {
            return Ok(false);
        }
        let actual = digest(secret, &salt, iterations);
        Ok(constant_time_eq(&actual, &expected))
    }
}

fn digest(
    secret: &str,
    salt: &VerifierSalt,
    iterations: u32,
) -> Zeroizing<[u8; DIGEST_LENGTH]> {
    let mut salted = Vec::with_capacity(VERIFIER_DOMAIN.len() + VERIFIER_SALT_LENGTH);
    salted.extend_from_slice(VERIFIER_DOMAIN);
    salted.extend_from_slice(salt);

    let mut out = Zeroizing::new([0u8; DIGEST_LENGTH]);
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), &salted, iterations, &mut out[..]);
    out
}

/// Constant-time comparison to prevent timing side channels.
fn constant_time_eq(a: &[u8; DIGEST_LENGTH], b: &[u8; DIGEST_LENGTH]) -> bool {
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
