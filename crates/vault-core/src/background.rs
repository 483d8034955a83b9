//! Off-thread key derivation and the auto-lock timer.
//!
//! Key derivation takes hundreds of milliseconds at default cost, so callers on an async runtime run
//! initialize/unlock on the blocking pool. Completion is observed by awaiting
//! the returned future; the result is the manager's own result.

use std::sync::{Arc, Weak};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;

use crate::error::{Result, VaultError};
use crate::manager::VaultKeyManager;

/// Run [`VaultKeyManager::initialize_vault_key`] on the blocking pool.
pub async fn initialize_in_background(
    manager: Arc<VaultKeyManager>,
    secret: SecretString,
    user_id: String,
) -> Result<()> {
    run_blocking(move || manager.initialize_vault_key(secret.expose_secret(), &user_id)).await
}

/// Run [`VaultKeyManager::unlock_vault`] on the blocking pool.
pub async fn unlock_in_background(
    manager: Arc<VaultKeyManager>,
    secret: SecretString,
    user_id: String,
) -> Result<()> {
    run_blocking(move || manager.unlock_vault(secret.expose_secret(), &user_id)).await
}

async fn run_blocking<F>(op: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| VaultError::Other(format!("Key derivation task failed: {}", e)))?
}

/// Periodically lock the vault once it has been idle past its timeout.
///
/// The task holds only a weak handle and exits when the manager is dropped.
/// Returns `None` when the manager has auto-lock disabled.
pub fn spawn_auto_lock(manager: &Arc<VaultKeyManager>) -> Option<JoinHandle<()>> {
    let timeout = manager.auto_lock_timeout()?;
    let period = check_period(timeout);
    let weak = Arc::downgrade(manager);
    Some(tokio::spawn(auto_lock_loop(weak, period)))
}

async fn auto_lock_loop(manager: Weak<VaultKeyManager>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(manager) = manager.upgrade() else {
            tracing::debug!("vault manager dropped, stopping auto-lock timer");
            return;
        };
        manager.lock_if_idle();
    }
}

/// Check a few times per timeout window, bounded to [10ms, 5s].
fn check_period(timeout: Duration) -> Duration {
    (timeout / 4).clamp(Duration::from_millis(10), Duration::from_secs(5))
}
