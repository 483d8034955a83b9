//! In-memory `VaultStore`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::crypto::{MasterSecretHash, Salt};
use crate::error::{Result, VaultError};
use crate::storage::traits::VaultStore;

#[derive(Debug, Default)]
struct UserRecord {
    salt: Option<Salt>,
    master_secret_hash: Option<MasterSecretHash>,
}

/// Process-local store keyed by user id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_users(&self) -> Result<MutexGuard<'_, HashMap<String, UserRecord>>> {
        self.users
            .lock()
            .map_err(|_| VaultError::Storage("Memory store poisoned".to_string()))
    }
}

impl VaultStore for MemoryStore {
    fn load_salt(&self, user_id: &str) -> Result<Option<Salt>> {
        Ok(self.lock_users()?.get(user_id).and_then(|record| record.salt))
    }

    fn save_salt(&self, user_id: &str, salt: &Salt) -> Result<()> {
        self.lock_users()?
            .entry(user_id.to_string())
            .or_default()
            .salt = Some(*salt);
        Ok(())
    }

    fn load_master_secret_hash(&self, user_id: &str) -> Result<Option<MasterSecretHash>> {
        Ok(self
            .lock_users()?
            .get(user_id)
            .and_then(|record| record.master_secret_hash.clone()))
    }

    fn save_master_secret_hash(&self, user_id: &str, hash: &MasterSecretHash) -> Result<()> {
        self.lock_users()?
            .entry(user_id.to_string())
            .or_default()
            .master_secret_hash = Some(hash.clone());
        Ok(())
    }

    fn save_user_record(
        &self,
        user_id: &str,
        salt: &Salt,
        hash: &MasterSecretHash,
    ) -> Result<()> {
        self.lock_users()?.insert(
            user_id.to_string(),
            UserRecord {
                salt: Some(*salt),
                master_secret_hash: Some(hash.clone()),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_user_returns_none() {
        let store = MemoryStore::new();
        assert!(store.load_salt("nobody").unwrap().is_none());
        assert!(store.load_master_secret_hash("nobody").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_per_user() {
        let store = MemoryStore::new();
        let salt1 = Salt::from_bytes([1u8; 32]);
        let salt2 = Salt::from_bytes([2u8; 32]);
        store.save_salt("user1", &salt1).unwrap();
        store.save_salt("user2", &salt2).unwrap();
        store
            .save_master_secret_hash("user1", &MasterSecretHash::from("h1".to_string()))
            .unwrap();

        assert_eq!(store.load_salt("user1").unwrap(), Some(salt1));
        assert_eq!(store.load_salt("user2").unwrap(), Some(salt2));
        assert_eq!(
            store.load_master_secret_hash("user1").unwrap().unwrap().as_str(),
            "h1"
        );
        assert!(store.load_master_secret_hash("user2").unwrap().is_none());
    }

    #[test]
    fn test_save_user_record_writes_both() {
        let store = MemoryStore::new();
        let salt = Salt::from_bytes([3u8; 32]);
        store
            .save_user_record("user1", &salt, &MasterSecretHash::from("h1".to_string()))
            .unwrap();

        assert_eq!(store.load_salt("user1").unwrap(), Some(salt));
        assert_eq!(
            store.load_master_secret_hash("user1").unwrap().unwrap().as_str(),
            "h1"
        );
    }
}
