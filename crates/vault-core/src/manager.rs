//! Vault key manager.
//!
//! Owns the single cached vault key of the process and the user it is bound
//! to. The manager is an ordinary value: construct one, share it behind an
//! `Arc`, and hand that handle to every collaborator that needs to encrypt
//! or decrypt. There is no global instance.
//!
//! ## States
//!
//! ```text
//!            initialize_vault_key / unlock_vault / set_cached_vault_key
//!   Locked ─────────────────────────────────────────────────────────────▶ Unlocked(user)
//!     ▲                                                                      │
//!     └──────────────── lock_vault / auto-lock timeout ◀─────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! The session sits behind an `RwLock`. Encrypt/decrypt hold the read lock
//! for the whole cipher call, so they run concurrently with each other while
//! `lock_vault` (write lock) waits for in-flight calls and then clears the
//! key. Once `lock_vault` returns, no new call can observe the key. Key
//! derivation runs before the write lock is taken, never under it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use crate::config::VaultConfig;
use crate::crypto::{
    cipher, derive_key, EncryptedRecord, KdfParams, MasterSecretHash, MasterSecretVerifier, Salt,
    VaultKey,
};
use crate::error::{Result, VaultError};
use crate::storage::VaultStore;
use crate::strength::validate_master_secret;

/// An unlocked session: the cached key and the user it belongs to.
///
/// Keeping both in one value makes "key present iff user present" hold by
/// construction. Dropping the session zeroizes the key.
struct VaultSession {
    user_id: String,
    key: VaultKey,
    started: Instant,
    /// Milliseconds after `started` of the last key use.
    last_used_ms: AtomicU64,
}

impl VaultSession {
    fn new(user_id: &str, key: VaultKey) -> Self {
        Self {
            user_id: user_id.to_string(),
            key,
            started: Instant::now(),
            last_used_ms: AtomicU64::new(0),
        }
    }

    fn touch(&self) {
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_used_ms.fetch_max(elapsed, Ordering::Relaxed);
    }

    fn idle_for(&self) -> Duration {
        let last_used = Duration::from_millis(self.last_used_ms.load(Ordering::Relaxed));
        self.started.elapsed().saturating_sub(last_used)
    }

    fn is_expired(&self, timeout: Option<Duration>) -> bool {
        timeout.is_some_and(|timeout| self.idle_for() >= timeout)
    }
}

/// Process-wide owner of the vault key.
pub struct VaultKeyManager {
    store: Arc<dyn VaultStore>,
    kdf: KdfParams,
    verifier: MasterSecretVerifier,
    auto_lock: Option<Duration>,
    session: RwLock<Option<VaultSession>>,
}

impl std::fmt::Debug for VaultKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKeyManager")
            .field("kdf", &self.kdf)
            .field("auto_lock", &self.auto_lock)
            .field("current_user_id", &self.current_user_id())
            .finish_non_exhaustive()
    }
}

impl VaultKeyManager {
    /// Build a manager from validated configuration.
    pub fn new(store: Arc<dyn VaultStore>, config: &VaultConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_params(
            store,
            config.kdf_params()?,
            config.verifier()?,
            config.auto_lock(),
        ))
    }

    /// Build a manager from explicit parameters.
    pub fn with_params(
        store: Arc<dyn VaultStore>,
        kdf: KdfParams,
        verifier: MasterSecretVerifier,
        auto_lock: Option<Duration>,
    ) -> Self {
        Self {
            store,
            kdf,
            verifier,
            auto_lock,
            session: RwLock::new(None),
        }
    }

    pub fn auto_lock_timeout(&self) -> Option<Duration> {
        self.auto_lock
    }

    fn read_session(&self) -> Result<RwLockReadGuard<'_, Option<VaultSession>>> {
        self.session
            .read()
            .map_err(|_| VaultError::Other("Vault session lock poisoned".to_string()))
    }

    fn write_session(&self) -> Result<RwLockWriteGuard<'_, Option<VaultSession>>> {
        self.session
            .write()
            .map_err(|_| VaultError::Other("Vault session lock poisoned".to_string()))
    }

    fn ensure_locked(&self) -> Result<()> {
        if self.read_session()?.is_some() {
            return Err(VaultError::SessionActive);
        }
        Ok(())
    }

    // --- Lifecycle ---

    /// Create the vault for a new user and unlock it.
    ///
    /// Generates and persists a fresh salt and verifier hash, derives the
    /// vault key, and caches it for `user_id`.
    ///
    /// # Errors
    ///
    /// - `VaultError::AlreadyInitialized` if the user already has a salt
    ///   (replacing it would orphan every record encrypted under it)
    /// - `VaultError::SessionActive` if a session is already unlocked
    /// - `VaultError::InvalidInput` if the secret fails the master-secret policy
    pub fn initialize_vault_key(&self, secret: &str, user_id: &str) -> Result<()> {
        validate_user_id(user_id)?;
        validate_master_secret(secret)?;
        self.ensure_locked()?;
        if self.store.load_salt(user_id)?.is_some() {
            return Err(VaultError::AlreadyInitialized(user_id.to_string()));
        }

        let salt = Salt::generate()?;
        let key = derive_key(secret, &salt, &self.kdf)?;
        let hash = self.verifier.hash(secret)?;

        let mut session = self.write_session()?;
        if session.is_some() {
            return Err(VaultError::SessionActive);
        }
        // Re-check under the lock: a concurrent initialize may have won.
        if self.store.load_salt(user_id)?.is_some() {
            return Err(VaultError::AlreadyInitialized(user_id.to_string()));
        }
        self.store.save_user_record(user_id, &salt, &hash)?;
        *session = Some(VaultSession::new(user_id, key));

        tracing::info!(user_id, "vault initialized and unlocked");
        Ok(())
    }

    /// Unlock an existing vault.
    ///
    /// The secret is checked against the stored verifier hash before any key
    /// is derived; on mismatch nothing is cached.
    ///
    /// # Errors
    ///
    /// - `VaultError::InvalidCredentials` on a wrong secret (recoverable)
    /// - `VaultError::NotInitialized` if the user has no vault
    /// - `VaultError::SessionActive` if a session is already unlocked
    pub fn unlock_vault(&self, secret: &str, user_id: &str) -> Result<()> {
        self.ensure_locked()?;

        let not_initialized = || VaultError::NotInitialized(user_id.to_string());
        let salt = self.store.load_salt(user_id)?.ok_or_else(not_initialized)?;
        let stored = self
            .store
            .load_master_secret_hash(user_id)?
            .ok_or_else(not_initialized)?;

        if !self.verifier.verify(secret, &stored)? {
            tracing::warn!(user_id, "unlock rejected: master secret mismatch");
            return Err(VaultError::InvalidCredentials);
        }

        let key = derive_key(secret, &salt, &self.kdf)?;

        let mut session = self.write_session()?;
        if session.is_some() {
            return Err(VaultError::SessionActive);
        }
        *session = Some(VaultSession::new(user_id, key));

        tracing::info!(user_id, "vault unlocked");
        Ok(())
    }

    /// Clear the cached key and user. Idempotent.
    ///
    /// Waits for in-flight encrypt/decrypt calls to finish first.
    pub fn lock_vault(&self) {
        // A poisoned lock still guards valid data; clearing it is always safe.
        let mut session = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = session.take() {
            tracing::info!(user_id = %previous.user_id, "vault locked");
        }
    }

    /// Lock the vault if the session has been idle past the auto-lock timeout.
    ///
    /// Returns `true` if this call locked it.
    pub fn lock_if_idle(&self) -> bool {
        let mut session = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let expired = session
            .as_ref()
            .is_some_and(|current| current.is_expired(self.auto_lock));
        if !expired {
            return false;
        }
        if let Some(previous) = session.take() {
            tracing::info!(user_id = %previous.user_id, "vault auto-locked after idle timeout");
        }
        true
    }

    /// Install an externally obtained key as the one authoritative session.
    ///
    /// Any previous session is replaced and its key zeroized.
    pub fn set_cached_vault_key(&self, key: VaultKey, user_id: &str) -> Result<()> {
        validate_user_id(user_id)?;
        let mut session = self.write_session()?;
        if let Some(previous) = session.take() {
            tracing::debug!(user_id = %previous.user_id, "replacing cached vault key");
        }
        *session = Some(VaultSession::new(user_id, key));
        tracing::info!(user_id, "vault key handed off to manager");
        Ok(())
    }

    // --- Queries ---

    /// Whether a non-expired session is cached.
    pub fn is_vault_unlocked(&self) -> bool {
        self.read_session()
            .map(|session| {
                session
                    .as_ref()
                    .is_some_and(|current| !current.is_expired(self.auto_lock))
            })
            .unwrap_or(false)
    }

    /// User bound to the current non-expired session.
    pub fn current_user_id(&self) -> Option<String> {
        let session = self.read_session().ok()?;
        session
            .as_ref()
            .filter(|current| !current.is_expired(self.auto_lock))
            .map(|current| current.user_id.clone())
    }

    /// Whether `user_id` already has a vault (unlock) or needs one (initialize).
    pub fn is_vault_initialized(&self, user_id: &str) -> Result<bool> {
        Ok(self.store.load_salt(user_id)?.is_some())
    }

    // --- Master-secret verification ---

    /// Hash a master secret with the configured verifier, under a fresh salt.
    pub fn hash_master_secret(&self, secret: &str) -> Result<MasterSecretHash> {
        self.verifier.hash(secret)
    }

    /// Check a master secret against the user's stored verifier hash.
    ///
    /// Does not touch the session; this is the local device gate.
    pub fn verify_master_secret(&self, secret: &str, user_id: &str) -> Result<bool> {
        let stored = self
            .store
            .load_master_secret_hash(user_id)?
            .ok_or_else(|| VaultError::NotInitialized(user_id.to_string()))?;
        self.verifier.verify(secret, &stored)
    }

    // --- Record encryption ---

    /// Encrypt a credential secret under the cached key.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::VaultLocked` if no session is cached or it expired.
    pub fn encrypt_password(&self, plaintext: &str) -> Result<EncryptedRecord> {
        self.with_key(|key| cipher::encrypt(plaintext, key))
    }

    /// Decrypt a credential secret under the cached key.
    ///
    /// # Errors
    ///
    /// - `VaultError::VaultLocked` if no session is cached or it expired
    /// - `VaultError::DecryptionFailed` if the blob does not belong to this key
    pub fn decrypt_password(&self, blob: &EncryptedRecord) -> Result<Zeroizing<String>> {
        self.with_key(|key| cipher::decrypt(blob, key))
    }

    fn with_key<T>(&self, op: impl FnOnce(&VaultKey) -> Result<T>) -> Result<T> {
        {
            let session = self.read_session()?;
            let current = session.as_ref().ok_or(VaultError::VaultLocked)?;
            if !current.is_expired(self.auto_lock) {
                current.touch();
                return op(&current.key);
            }
        }
        self.lock_if_idle();
        Err(VaultError::VaultLocked)
    }
}

fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(VaultError::InvalidInput(
            "User id cannot be empty".to_string(),
        ));
    }
    Ok(())
}
