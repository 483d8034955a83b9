//! `vault init`: create the vault for a user.

use std::path::PathBuf;
use std::sync::Arc;

use vault_core::{
    calculate_strength, validate_master_secret, SqliteStore, StrengthLevel, VaultConfig,
    VaultKeyManager,
};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{read_config, write_config, VaultCliConfig};
use crate::errors::CliError;
use crate::helpers::{is_interactive, prompt_new_master_secret};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = match args.config_path.as_deref() {
        Some(path) => PathBuf::from(path),
        None => resolve_config_path()?,
    };
    let existing = if config_path.exists() {
        Some(read_config(&config_path)?)
    } else {
        None
    };

    let vault_path = match args.path.as_deref() {
        Some(path) => PathBuf::from(path),
        None => ctx.vault_path()?,
    };
    let user_id = ctx.user_id()?;
    if vault_path.exists() {
        ensure_user_absent(&SqliteStore::open(&vault_path)?, &user_id)?;
    }

    let mut security = existing
        .as_ref()
        .map(|config| config.security.clone())
        .unwrap_or_default();
    apply_overrides(&mut security, args);
    security.validate()?;

    let interactive = is_interactive(args.no_input);
    let secret = prompt_new_master_secret(interactive)?;
    validate_master_secret(&secret)?;
    let level = StrengthLevel::from_score(calculate_strength(&secret));
    if level < StrengthLevel::Good && !ctx.quiet() {
        eprintln!(
            "Warning: master secret strength is {}. A longer passphrase is recommended.",
            level.label()
        );
    }

    let store = Arc::new(SqliteStore::open(&vault_path)?);
    let recorded = store.record_kdf_iterations(security.kdf_iterations)?;
    if recorded != security.kdf_iterations {
        if args.kdf_iterations.is_some() && !ctx.quiet() {
            eprintln!(
                "Note: this vault already uses {} KDF iterations; --kdf-iterations ignored.",
                recorded
            );
        }
        security.kdf_iterations = recorded;
    }

    tracing::debug!(
        path = %vault_path.display(),
        kdf_iterations = security.kdf_iterations,
        "creating vault user"
    );
    let manager = VaultKeyManager::new(store.clone(), &security)?;
    manager.initialize_vault_key(&secret, &user_id)?;
    manager.lock_vault();

    if existing.is_none() {
        let config = VaultCliConfig::new(vault_path.clone(), Some(user_id.clone()), security);
        write_config(&config_path, &config)?;
        if !ctx.quiet() {
            println!("Config written to {}", config_path.display());
        }
    } else if has_overrides(args) && !ctx.quiet() {
        eprintln!(
            "Note: existing config {} was not modified.",
            config_path.display()
        );
    }

    if !ctx.quiet() {
        println!("Vault initialized at {}", vault_path.display());
        println!("User: {}", user_id);
    }
    Ok(())
}

fn apply_overrides(security: &mut VaultConfig, args: &InitArgs) {
    if let Some(iterations) = args.kdf_iterations {
        security.kdf_iterations = iterations;
    }
    if let Some(iterations) = args.verifier_iterations {
        security.verifier_iterations = iterations;
    }
    if let Some(seconds) = args.auto_lock_seconds {
        security.auto_lock_seconds = seconds;
    }
}

fn has_overrides(args: &InitArgs) -> bool {
    args.kdf_iterations.is_some()
        || args.verifier_iterations.is_some()
        || args.auto_lock_seconds.is_some()
}

/// Reject init before prompting when the user already has a vault.
fn ensure_user_absent(store: &SqliteStore, user_id: &str) -> anyhow::Result<()> {
    if store.list_users()?.iter().any(|user| user == user_id) {
        return Err(CliError::invalid_input(format!(
            "A vault already exists for user '{}'.",
            user_id
        ))
        .into());
    }
    Ok(())
}
