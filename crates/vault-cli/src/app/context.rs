//! Application context for the Vault CLI.
//!
//! Combines CLI arguments with the lazily-loaded config file.

use std::cell::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

use vault_core::{SqliteStore, VaultConfig};

use crate::cli::Cli;
use crate::config::{read_config, VaultCliConfig};
use crate::errors::CliError;

use super::resolver::{missing_vault_message, resolve_config_path, resolve_user_id, resolve_vault_path};
use super::session::{unlock_with_retry, UnlockedVault};

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<VaultCliConfig>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, if one exists. Loaded once.
    pub fn config(&self) -> anyhow::Result<Option<&VaultCliConfig>> {
        if self.config.get().is_none() {
            let path = resolve_config_path()?;
            let loaded = if path.exists() {
                Some(read_config(&path)?)
            } else {
                None
            };
            let _ = self.config.set(loaded);
        }
        Ok(self.config.get().and_then(Option::as_ref))
    }

    pub fn vault_path(&self) -> anyhow::Result<PathBuf> {
        resolve_vault_path(self.cli, self.config()?)
    }

    pub fn user_id(&self) -> anyhow::Result<String> {
        Ok(resolve_user_id(self.cli, self.config()?))
    }

    /// Security settings for an existing vault.
    ///
    /// The KDF cost recorded in the vault overrides the config file.
    pub fn vault_config(&self, store: &SqliteStore) -> anyhow::Result<VaultConfig> {
        let mut config = self
            .config()?
            .map(|c| c.security.clone())
            .unwrap_or_default();
        if let Some(iterations) = store.kdf_iterations()? {
            config.kdf_iterations = iterations;
        }
        Ok(config)
    }

    /// Open an existing vault database.
    pub fn open_store(&self) -> anyhow::Result<Arc<SqliteStore>> {
        let path = self.vault_path()?;
        if !path.exists() {
            return Err(CliError::not_found(
                missing_vault_message(&path),
                "Hint: Run `vault init` to create a vault.",
            )
            .into());
        }
        Ok(Arc::new(SqliteStore::open(&path)?))
    }

    /// Open the vault and unlock it for the resolved user.
    pub fn unlock(&self, no_input: bool) -> anyhow::Result<UnlockedVault> {
        unlock_with_retry(self, no_input)
    }
}
