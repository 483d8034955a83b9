//! Tunable vault parameters.
//!
//! Defaults are the secure settings. Lowering an iteration count requires
//! writing it into the configuration explicitly, and is logged when applied.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{DEFAULT_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use crate::crypto::{KdfParams, MasterSecretVerifier};
use crate::error::{Result, VaultError};

/// Default idle time before an unlocked session auto-locks.
pub const DEFAULT_AUTO_LOCK_SECONDS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// PBKDF2 iterations for vault key derivation
    pub kdf_iterations: u32,

    /// PBKDF2 iterations for new master-secret verifier hashes
    pub verifier_iterations: u32,

    /// Idle seconds before auto-lock (0 disables)
    pub auto_lock_seconds: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            verifier_iterations: DEFAULT_KDF_ITERATIONS,
            auto_lock_seconds: DEFAULT_AUTO_LOCK_SECONDS,
        }
    }
}

impl VaultConfig {
    /// Reject settings that are unsafe at any explicit value.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("kdf_iterations", self.kdf_iterations),
            ("verifier_iterations", self.verifier_iterations),
        ] {
            if value < MIN_KDF_ITERATIONS {
                return Err(VaultError::Config(format!(
                    "{} must be at least {} (got {})",
                    name, MIN_KDF_ITERATIONS, value
                )));
            }
        }
        Ok(())
    }

    pub fn kdf_params(&self) -> Result<KdfParams> {
        if self.kdf_iterations == DEFAULT_KDF_ITERATIONS {
            return Ok(KdfParams::default());
        }
        KdfParams::with_iterations(self.kdf_iterations)
    }

    pub fn verifier(&self) -> Result<MasterSecretVerifier> {
        if self.verifier_iterations == DEFAULT_KDF_ITERATIONS {
            return Ok(MasterSecretVerifier::default());
        }
        MasterSecretVerifier::with_iterations(self.verifier_iterations)
    }

    pub fn auto_lock(&self) -> Option<Duration> {
        (self.auto_lock_seconds > 0).then(|| Duration::from_secs(self.auto_lock_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_secure() {
        let config = VaultConfig::default();
        assert_eq!(config.kdf_iterations, 100_000);
        assert_eq!(config.kdf_params().unwrap(), KdfParams::default());
        assert_eq!(config.auto_lock(), Some(Duration::from_secs(300)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: VaultConfig = serde_json::from_str(r#"{"auto_lock_seconds": 0}"#).unwrap();
        assert_eq!(config.kdf_iterations, DEFAULT_KDF_ITERATIONS);
        assert_eq!(config.auto_lock(), None);
    }

    #[test]
    fn test_explicit_lower_iterations_accepted() {
        let config = VaultConfig {
            kdf_iterations: 5_000,
            ..VaultConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.kdf_params().unwrap().iterations(), 5_000);
    }

    #[test]
    fn test_iterations_below_floor_rejected() {
        let config = VaultConfig {
            verifier_iterations: 10,
            ..VaultConfig::default()
        };
        assert!(matches!(config.validate(), Err(VaultError::Config(_))));
        assert!(config.verifier().is_err());
    }
}
