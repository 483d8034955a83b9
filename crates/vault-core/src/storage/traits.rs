//! Storage collaborator trait.
//!
//! The `VaultStore` trait is the only persistence the vault key manager
//! needs. Everything it stores is safe to keep in any store, including a
//! synced cloud store: salts and verifier hashes are not secret.

use crate::crypto::{MasterSecretHash, Salt};
use crate::error::Result;

/// Persistence interface consumed by the vault key manager.
///
/// Implementations must be safe to share across threads; timeouts and
/// retries are the implementation's concern.
pub trait VaultStore: Send + Sync {
    /// Load the user's vault salt.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if no vault was initialized for this user.
    fn load_salt(&self, user_id: &str) -> Result<Option<Salt>>;

    /// Persist the user's vault salt.
    fn save_salt(&self, user_id: &str, salt: &Salt) -> Result<()>;

    /// Load the user's master-secret verifier hash.
    fn load_master_secret_hash(&self, user_id: &str) -> Result<Option<MasterSecretHash>>;

    /// Persist the user's master-secret verifier hash.
    fn save_master_secret_hash(&self, user_id: &str, hash: &MasterSecretHash) -> Result<()>;

    /// Persist a new user's salt and verifier hash together.
    ///
    /// Either both values are stored or neither is. A salt without its hash
    /// would mark the user initialized while making unlock impossible.
    fn save_user_record(
        &self,
        user_id: &str,
        salt: &Salt,
        hash: &MasterSecretHash,
    ) -> Result<()>;
}
