//! # Vault Core
//!
//! Cryptographic core for a local password vault: derives a vault key from
//! a master secret, encrypts and decrypts individual credential secrets, and
//! owns the in-memory lifecycle of the derived key.
//!
//! ## Architecture
//!
//! - **crypto**: random source, key derivation, record cipher, master-secret verifier
//! - **manager**: the vault key manager (locked/unlocked session state machine)
//! - **background**: off-thread derivation and the auto-lock timer
//! - **strength**: password strength scoring and secure generation
//! - **storage**: the persistence seam (`VaultStore`) and its implementations
//! - **config**: tunable parameters (KDF cost, auto-lock timeout)

pub mod background;
pub mod config;
pub mod crypto;
pub mod error;
pub mod manager;
pub mod storage;
pub mod strength;

pub use config::VaultConfig;
pub use crypto::{
    decrypt, derive_key, encrypt, DecryptFailure, EncryptedRecord, KdfParams, MasterSecretHash,
    MasterSecretVerifier, Salt, VaultKey,
};
pub use error::{Result, VaultError};
pub use manager::VaultKeyManager;
pub use storage::{MemoryStore, SqliteStore, VaultStore};
pub use strength::{
    calculate_strength, generate_secure_password, validate_master_secret, StrengthLevel,
};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
