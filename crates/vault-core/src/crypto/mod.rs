//! Cryptographic operations for the vault.
//!
//! This module provides the primitives the vault key manager is built on,
//! using well-audited RustCrypto implementations:
//! - **PBKDF2-HMAC-SHA256**: master secret -> 32-byte vault key
//! - **AES-256-GCM**: per-record authenticated encryption
//! - **OS random source**: salts, nonces, generated passwords
//!
//! ## Security Model
//!
//! - The vault key is derived from the master secret and a per-user random salt
//! - Every encrypted record carries its own random nonce
//! - The master-secret verifier uses an independent salt path, so its hash
//!   never doubles as key material
//! - Key material is zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the stored blobs, salts, and verifier hashes
//! - Offline brute-force attacks (slowed by iterated derivation)
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session's memory

pub mod cipher;
pub mod kdf;
pub mod random;
pub mod verifier;

pub use cipher::{decrypt, encrypt, DecryptFailure, EncryptedRecord};
pub use kdf::{derive_key, KdfParams, Salt, VaultKey, DEFAULT_KDF_ITERATIONS};
pub use random::{fill_random, random_array, random_bytes, random_index};
pub use verifier::{MasterSecretHash, MasterSecretVerifier, VerifierSalt, VERIFIER_SALT_LENGTH};
