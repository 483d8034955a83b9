//! Error types for vault core operations.
//!
//! Every expected failure (locked vault, wrong master secret, undecryptable
//! blob) is a distinct variant so callers can branch on the kind without
//! inspecting message text. No variant ever carries secret material.

use thiserror::Error;

use crate::crypto::DecryptFailure;

/// Result type alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Encrypt/decrypt attempted while no vault key is cached
    #[error("Vault is locked")]
    VaultLocked,

    /// Wrong master secret on unlock
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Blob could not be decrypted (malformed, tampered, or wrong key).
    ///
    /// The reason code is only visible through `Debug` / [`VaultError::decrypt_failure`].
    #[error("Decryption failed")]
    DecryptionFailed(DecryptFailure),

    /// The operating system's secure random source failed
    #[error("Secure random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    /// A vault already exists for this user; re-initializing would orphan its records
    #[error("Vault already initialized for user: {0}")]
    AlreadyInitialized(String),

    /// No vault exists for this user yet
    #[error("Vault not initialized for user: {0}")]
    NotInitialized(String),

    /// A session is already unlocked; lock it first
    #[error("A vault session is already active")]
    SessionActive,

    /// Low-level cryptographic failure (never includes key or plaintext)
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

impl VaultError {
    /// Whether the caller can reasonably recover (prompt again, unlock first).
    ///
    /// A failing random source is never recoverable: the process must not
    /// continue with a weaker generator.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VaultError::VaultLocked
                | VaultError::InvalidCredentials
                | VaultError::DecryptionFailed(_)
        )
    }

    /// Diagnostic reason code for a decryption failure, if this is one.
    pub fn decrypt_failure(&self) -> Option<DecryptFailure> {
        match self {
            VaultError::DecryptionFailed(reason) => Some(*reason),
            _ => None,
        }
    }
}
