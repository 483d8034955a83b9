//! SQLite storage backend.
//!
//! Holds one row per vault user (salt + verifier hash) and one row per
//! credential (metadata + encrypted secret). Nothing in this file ever sees
//! a plaintext secret or a vault key, so the database itself is not
//! encrypted; its file is still created owner-only.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::crypto::{EncryptedRecord, MasterSecretHash, Salt};
use crate::error::{Result, VaultError};
use crate::storage::traits::VaultStore;
use crate::storage::types::{Credential, CredentialFilter, NewCredential};

/// On-disk format version written to the `meta` table.
pub const FORMAT_VERSION: &str = "1";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS vault_users (
        user_id TEXT PRIMARY KEY,
        salt BLOB,
        master_secret_hash TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS credentials (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        site TEXT NOT NULL,
        username TEXT NOT NULL,
        category TEXT,
        tags_json TEXT,
        secret TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS credentials_user_site
    ON credentials (user_id, site);
"#;

const CREDENTIAL_COLUMNS: &str =
    "id, user_id, site, username, category, tags_json, secret, created_at, updated_at";

/// SQLite-backed vault store.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

/// Raw row data from the credentials table, before parsing into domain types.
#[derive(Debug)]
struct CredentialRow {
    id: String,
    user_id: String,
    site: String,
    username: String,
    category: Option<String>,
    tags_json: Option<String>,
    secret: String,
    created_at: String,
    updated_at: String,
}

impl CredentialRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            site: row.get(2)?,
            username: row.get(3)?,
            category: row.get(4)?,
            tags_json: row.get(5)?,
            secret: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| VaultError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

impl TryFrom<CredentialRow> for Credential {
    type Error = VaultError;

    fn try_from(row: CredentialRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| VaultError::Storage(format!("Invalid credential UUID: {}", e)))?;
        let tags: Vec<String> = match row.tags_json {
            Some(ref value) => serde_json::from_str(value)
                .map_err(|e| VaultError::Storage(format!("Invalid tags JSON: {}", e)))?,
            None => Vec::new(),
        };

        Ok(Credential {
            id,
            user_id: row.user_id,
            site: row.site,
            username: row.username,
            category: row.category,
            tags,
            secret: EncryptedRecord::from(row.secret),
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

impl SqliteStore {
    /// Open (creating if needed) a store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self::init(Some(path.to_path_buf()), conn)?;
        set_file_permissions(path)?;
        Ok(store)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(None, Connection::open_in_memory()?)
    }

    fn init(path: Option<PathBuf>, conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?1)",
            params![FORMAT_VERSION],
        )?;

        let version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        if version != FORMAT_VERSION {
            return Err(VaultError::Storage(format!(
                "Unsupported vault format version: {}",
                version
            )));
        }

        tracing::debug!(path = ?path, "opened vault store");
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Ids of every user with a stored salt.
    pub fn list_users(&self) -> Result<Vec<String>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id FROM vault_users WHERE salt IS NOT NULL ORDER BY user_id",
        )?;
        let users = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(users)
    }

    // --- Credential operations ---

    /// Insert a new credential for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` if site or username is blank.
    pub fn insert_credential(&self, user_id: &str, credential: &NewCredential) -> Result<Uuid> {
        if credential.site.trim().is_empty() {
            return Err(VaultError::InvalidInput("Site cannot be empty".to_string()));
        }
        if credential.username.trim().is_empty() {
            return Err(VaultError::InvalidInput(
                "Username cannot be empty".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let tags_json = if credential.tags.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&credential.tags)?)
        };

        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO credentials ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                CREDENTIAL_COLUMNS
            ),
            params![
                id.to_string(),
                user_id,
                credential.site.trim(),
                credential.username.trim(),
                credential.category.as_deref(),
                tags_json,
                credential.secret.as_str(),
                now,
            ],
        )?;
        Ok(id)
    }

    /// Get a credential by id.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if not found or owned by another user.
    pub fn get_credential(&self, user_id: &str, id: &Uuid) -> Result<Option<Credential>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM credentials WHERE id = ?1 AND user_id = ?2",
                    CREDENTIAL_COLUMNS
                ),
                params![id.to_string(), user_id],
                CredentialRow::from_row,
            )
            .optional()?;
        row.map(Credential::try_from).transpose()
    }

    /// List a user's credentials, ordered by site then username.
    pub fn list_credentials(
        &self,
        user_id: &str,
        filter: &CredentialFilter,
    ) -> Result<Vec<Credential>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM credentials
             WHERE user_id = ?1 AND (?2 IS NULL OR category = ?2)
             ORDER BY site COLLATE NOCASE, username COLLATE NOCASE",
            CREDENTIAL_COLUMNS
        ))?;
        let rows = stmt
            .query_map(
                params![user_id, filter.category.as_deref()],
                CredentialRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<CredentialRow>>>()?;

        let needle = filter.site_contains.as_ref().map(|s| s.to_lowercase());
        let mut credentials = Vec::with_capacity(rows.len());
        for row in rows {
            if filter.limit.is_some_and(|limit| credentials.len() >= limit) {
                break;
            }
            if let Some(ref needle) = needle {
                if !row.site.to_lowercase().contains(needle) {
                    continue;
                }
            }
            credentials.push(Credential::try_from(row)?);
        }
        Ok(credentials)
    }

    /// Replace a credential's encrypted secret.
    ///
    /// Returns `false` if no such credential exists for the user.
    pub fn update_credential_secret(
        &self,
        user_id: &str,
        id: &Uuid,
        secret: &EncryptedRecord,
    ) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE credentials SET secret = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            params![
                secret.as_str(),
                Utc::now().to_rfc3339(),
                id.to_string(),
                user_id
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a credential. Returns `false` if it did not exist.
    pub fn delete_credential(&self, user_id: &str, id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "DELETE FROM credentials WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
        )?;
        Ok(changed > 0)
    }

    // --- Vault parameters ---

    /// Key-derivation cost the vault was created with, if recorded.
    ///
    /// Every user's key must be re-derived at this cost, so it lives with the
    /// data rather than in user configuration.
    pub fn kdf_iterations(&self) -> Result<Option<u32>> {
        let conn = self.lock_conn()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'kdf_iterations'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|v| {
                v.parse::<u32>().map_err(|_| {
                    VaultError::Storage(format!("Invalid kdf_iterations in vault: {}", v))
                })
            })
            .transpose()
    }

    /// Record the key-derivation cost. Only the first call takes effect.
    pub fn record_kdf_iterations(&self, iterations: u32) -> Result<u32> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('kdf_iterations', ?1)",
            params![iterations.to_string()],
        )?;
        drop(conn);
        Ok(self.kdf_iterations()?.unwrap_or(iterations))
    }

    // --- Maintenance operations ---

    /// Run SQLite's integrity check.
    pub fn check_integrity(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if result != "ok" {
            return Err(VaultError::Storage(format!(
                "Integrity check failed: {}",
                result
            )));
        }
        Ok(())
    }
}

impl VaultStore for SqliteStore {
    fn load_salt(&self, user_id: &str) -> Result<Option<Salt>> {
        let conn = self.lock_conn()?;
        let salt: Option<Option<Vec<u8>>> = conn
            .query_row(
                "SELECT salt FROM vault_users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        salt.flatten()
            .map(|bytes| {
                Salt::from_slice(&bytes)
                    .map_err(|_| VaultError::Storage("Stored salt has invalid length".to_string()))
            })
            .transpose()
    }

    fn save_salt(&self, user_id: &str, salt: &Salt) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO vault_users (user_id, salt, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET salt = excluded.salt",
            params![user_id, salt.as_bytes().as_slice(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load_master_secret_hash(&self, user_id: &str) -> Result<Option<MasterSecretHash>> {
        let conn = self.lock_conn()?;
        let hash: Option<Option<String>> = conn
            .query_row(
                "SELECT master_secret_hash FROM vault_users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash.flatten().map(MasterSecretHash::from))
    }

    fn save_master_secret_hash(&self, user_id: &str, hash: &MasterSecretHash) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO vault_users (user_id, master_secret_hash, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET master_secret_hash = excluded.master_secret_hash",
            params![user_id, hash.as_str(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn save_user_record(
        &self,
        user_id: &str,
        salt: &Salt,
        hash: &MasterSecretHash,
    ) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO vault_users (user_id, salt, master_secret_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                 salt = excluded.salt,
                 master_secret_hash = excluded.master_secret_hash",
            params![
                user_id,
                salt.as_bytes().as_slice(),
                hash.as_str(),
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn set_file_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> EncryptedRecord {
        EncryptedRecord::from(text)
    }

    #[test]
    fn test_salt_and_hash_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_salt("user1").unwrap().is_none());

        let salt = Salt::from_bytes([7u8; 32]);
        store.save_salt("user1", &salt).unwrap();
        store
            .save_master_secret_hash("user1", &MasterSecretHash::from("hash".to_string()))
            .unwrap();

        assert_eq!(store.load_salt("user1").unwrap(), Some(salt));
        assert_eq!(
            store.load_master_secret_hash("user1").unwrap().unwrap().as_str(),
            "hash"
        );
        assert_eq!(store.list_users().unwrap(), vec!["user1".to_string()]);
    }

    #[test]
    fn test_save_user_record_is_all_or_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .lock_conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_hash BEFORE INSERT ON vault_users
                 WHEN NEW.master_secret_hash = 'unwritable'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let salt = Salt::from_bytes([9u8; 32]);
        let result = store.save_user_record(
            "user1",
            &salt,
            &MasterSecretHash::from("unwritable".to_string()),
        );
        assert!(result.is_err());
        assert!(store.load_salt("user1").unwrap().is_none());
        assert!(store.load_master_secret_hash("user1").unwrap().is_none());
        assert!(store.list_users().unwrap().is_empty());

        store
            .save_user_record("user1", &salt, &MasterSecretHash::from("hash".to_string()))
            .unwrap();
        assert_eq!(store.load_salt("user1").unwrap(), Some(salt));
        assert_eq!(
            store.load_master_secret_hash("user1").unwrap().unwrap().as_str(),
            "hash"
        );
    }

    #[test]
    fn test_hash_without_salt_is_not_a_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .save_master_secret_hash("half", &MasterSecretHash::from("hash".to_string()))
            .unwrap();
        assert!(store.load_salt("half").unwrap().is_none());
        assert!(store.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_credential_crud() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store
            .insert_credential(
                "user1",
                &NewCredential::new("github.com", "octocat", record("blob-1"))
                    .with_category("work")
                    .with_tags(vec!["dev".to_string()]),
            )
            .unwrap();

        let fetched = store.get_credential("user1", &id).unwrap().unwrap();
        assert_eq!(fetched.site, "github.com");
        assert_eq!(fetched.category.as_deref(), Some("work"));
        assert_eq!(fetched.tags, vec!["dev".to_string()]);
        assert_eq!(fetched.secret.as_str(), "blob-1");

        assert!(store
            .update_credential_secret("user1", &id, &record("blob-2"))
            .unwrap());
        let updated = store.get_credential("user1", &id).unwrap().unwrap();
        assert_eq!(updated.secret.as_str(), "blob-2");
        assert!(updated.updated_at >= fetched.updated_at);

        assert!(store.delete_credential("user1", &id).unwrap());
        assert!(!store.delete_credential("user1", &id).unwrap());
        assert!(store.get_credential("user1", &id).unwrap().is_none());
    }

    #[test]
    fn test_credentials_scoped_by_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store
            .insert_credential("user1", &NewCredential::new("site", "me", record("blob")))
            .unwrap();

        assert!(store.get_credential("user2", &id).unwrap().is_none());
        assert!(!store.delete_credential("user2", &id).unwrap());
        assert!(store
            .list_credentials("user2", &CredentialFilter::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_filters() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (site, category) in [
            ("github.com", Some("work")),
            ("bank.example", None),
            ("gitlab.com", Some("work")),
        ] {
            let mut new = NewCredential::new(site, "me", record("blob"));
            if let Some(category) = category {
                new = new.with_category(category);
            }
            store.insert_credential("user1", &new).unwrap();
        }

        let all = store
            .list_credentials("user1", &CredentialFilter::new())
            .unwrap();
        let sites: Vec<&str> = all.iter().map(|c| c.site.as_str()).collect();
        assert_eq!(sites, vec!["bank.example", "github.com", "gitlab.com"]);

        let work = store
            .list_credentials("user1", &CredentialFilter::new().category("work"))
            .unwrap();
        assert_eq!(work.len(), 2);

        let git = store
            .list_credentials("user1", &CredentialFilter::new().site_contains("GIT").limit(1))
            .unwrap();
        assert_eq!(git.len(), 1);
        assert_eq!(git[0].site, "github.com");
    }

    #[test]
    fn test_blank_metadata_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.insert_credential("user1", &NewCredential::new(" ", "me", record("b")));
        assert!(matches!(result, Err(VaultError::InvalidInput(_))));
        let result = store.insert_credential("user1", &NewCredential::new("site", "", record("b")));
        assert!(matches!(result, Err(VaultError::InvalidInput(_))));
    }

    #[test]
    fn test_kdf_iterations_recorded_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.kdf_iterations().unwrap(), None);
        assert_eq!(store.record_kdf_iterations(5_000).unwrap(), 5_000);
        assert_eq!(store.record_kdf_iterations(9_000).unwrap(), 5_000);
        assert_eq!(store.kdf_iterations().unwrap(), Some(5_000));
    }

    #[test]
    fn test_integrity_check_ok() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.check_integrity().is_ok());
    }
}
