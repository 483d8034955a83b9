//! Credential record types.
//!
//! Everything except `secret` is plaintext metadata; the crypto core never
//! reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::EncryptedRecord;

/// A stored credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Unique identifier for this credential
    pub id: Uuid,

    /// Owning vault user
    pub user_id: String,

    /// Site or service name (e.g., "github.com")
    pub site: String,

    /// Account name at the site
    pub username: String,

    /// Optional grouping (e.g., "work")
    pub category: Option<String>,

    /// Free-form tags
    pub tags: Vec<String>,

    /// Encrypted secret produced by the vault key manager
    pub secret: EncryptedRecord,

    /// When this credential was created
    pub created_at: DateTime<Utc>,

    /// When the secret was last replaced
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a new credential.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub site: String,
    pub username: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub secret: EncryptedRecord,
}

impl NewCredential {
    pub fn new(site: impl Into<String>, username: impl Into<String>, secret: EncryptedRecord) -> Self {
        Self {
            site: site.into(),
            username: username.into(),
            category: None,
            tags: Vec::new(),
            secret,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Filter for listing credentials.
#[derive(Debug, Clone, Default)]
pub struct CredentialFilter {
    /// Only this category
    pub category: Option<String>,

    /// Case-insensitive substring match on site
    pub site_contains: Option<String>,

    /// Maximum number of results
    pub limit: Option<usize>,
}

impl CredentialFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn site_contains(mut self, needle: impl Into<String>) -> Self {
        self.site_contains = Some(needle.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
