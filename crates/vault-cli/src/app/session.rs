//! Unlocking the vault with retry logic.

use std::ops::Deref;
use std::sync::Arc;

use vault_core::{SqliteStore, VaultError, VaultKeyManager};

use crate::constants::MAX_UNLOCK_ATTEMPTS;
use crate::errors::CliError;
use crate::helpers::{env_master_secret, is_interactive, prompt_master_secret};

use super::context::AppContext;

/// An unlocked vault for one invocation. Locks when dropped.
pub struct UnlockedVault {
    store: Arc<SqliteStore>,
    manager: VaultKeyManager,
}

impl UnlockedVault {
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// The user this session was unlocked for.
    pub fn user_id(&self) -> anyhow::Result<String> {
        self.manager
            .current_user_id()
            .ok_or_else(|| VaultError::VaultLocked.into())
    }
}

impl Deref for UnlockedVault {
    type Target = VaultKeyManager;

    fn deref(&self) -> &Self::Target {
        &self.manager
    }
}

impl Drop for UnlockedVault {
    fn drop(&mut self) {
        self.manager.lock_vault();
    }
}

/// Open the vault and unlock it, prompting up to three times on a TTY.
pub fn unlock_with_retry(ctx: &AppContext<'_>, no_input: bool) -> anyhow::Result<UnlockedVault> {
    let store = ctx.open_store()?;
    let user_id = ctx.user_id()?;
    let config = ctx.vault_config(&store)?;
    let manager = VaultKeyManager::new(store.clone(), &config)?;

    if !manager.is_vault_initialized(&user_id)? {
        return Err(VaultError::NotInitialized(user_id).into());
    }

    let interactive = is_interactive(no_input);

    // An env secret is a single non-retryable attempt.
    if let Some(secret) = env_master_secret() {
        manager.unlock_vault(&secret, &user_id)?;
        return Ok(UnlockedVault { store, manager });
    }

    let max_attempts = if interactive { MAX_UNLOCK_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let secret = prompt_master_secret(interactive)?;
        match manager.unlock_vault(&secret, &user_id) {
            Ok(()) => return Ok(UnlockedVault { store, manager }),
            Err(VaultError::InvalidCredentials) => {
                tracing::debug!(user_id = %user_id, attempts, "master secret rejected");
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    return Err(CliError::auth_failed_with_hint(
                        "Too many failed master secret attempts.",
                        "Hint: If you forgot your master secret, the stored passwords cannot be recovered.",
                    )
                    .into());
                }
                eprintln!(
                    "Incorrect master secret. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}
