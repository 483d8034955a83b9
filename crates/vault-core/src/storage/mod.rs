//! Storage abstraction for the vault.
//!
//! The crypto core treats persistence as a simple key-value collaborator
//! keyed by user id: it stores the per-user salt and the master-secret
//! verifier hash, both non-secret. Encrypted credential records are opaque
//! strings to the store.
//!
//! ## Backends
//!
//! - `MemoryStore`: process-local maps, for tests and embedding
//! - `SqliteStore`: a SQLite file holding user rows and credential records

pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::VaultStore;
pub use types::{Credential, CredentialFilter, NewCredential};
