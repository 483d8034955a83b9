//! Input helper functions for the CLI.

use std::io::{self, IsTerminal, Read};

use dialoguer::{Confirm, Password};
use uuid::Uuid;
use vault_core::storage::CredentialFilter;
use vault_core::SqliteStore;
use zeroize::Zeroizing;

use crate::constants::MIN_ID_PREFIX_LEN;
use crate::errors::CliError;

/// Master secret from VAULT_PASSPHRASE, if set.
pub fn env_master_secret() -> Option<Zeroizing<String>> {
    std::env::var("VAULT_PASSPHRASE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(Zeroizing::new)
}

/// Prompt for the master secret, or read it from VAULT_PASSPHRASE.
pub fn prompt_master_secret(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(secret) = env_master_secret() {
        return Ok(secret);
    }
    if !interactive {
        return Err(CliError::invalid_input(
            "No master secret provided and no TTY available. Set VAULT_PASSPHRASE.",
        )
        .into());
    }
    Password::new()
        .with_prompt("Master secret")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read master secret: {}", e))
}

/// Prompt for a new master secret with confirmation (for init).
pub fn prompt_new_master_secret(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(secret) = env_master_secret() {
        return Ok(secret);
    }
    if !interactive {
        return Err(CliError::invalid_input(
            "No master secret provided and no TTY available. Set VAULT_PASSPHRASE.",
        )
        .into());
    }
    Password::new()
        .with_prompt("New master secret")
        .with_confirmation("Confirm master secret", "Secrets do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read master secret: {}", e))
}

/// Read a credential password: piped stdin, or a confirmed prompt on a TTY.
pub fn read_password_input(prompt: &str, confirm: bool) -> anyhow::Result<Zeroizing<String>> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut buffer = Zeroizing::new(String::new());
        stdin
            .lock()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let trimmed = Zeroizing::new(trim_line_ending(&buffer).to_string());
        if trimmed.is_empty() {
            return Err(CliError::invalid_input("No password provided on stdin.").into());
        }
        return Ok(trimmed);
    }

    let mut password = Password::new().with_prompt(prompt);
    if confirm {
        password = password.with_confirmation("Confirm", "Passwords do not match");
    }
    password
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

fn trim_line_ending(value: &str) -> &str {
    value
        .strip_suffix("\r\n")
        .or_else(|| value.strip_suffix('\n'))
        .unwrap_or(value)
}

/// Ask a yes/no question; non-interactive callers must pass `--yes`.
pub fn confirm(prompt: &str, interactive: bool) -> anyhow::Result<bool> {
    if !interactive {
        return Err(CliError::invalid_input(
            "Confirmation required but no TTY available. Pass --yes.",
        )
        .into());
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))
}

/// Whether prompts may be shown.
pub fn is_interactive(no_input: bool) -> bool {
    io::stdin().is_terminal() && !no_input
}

/// Resolve a full UUID or unique prefix to a credential id.
pub fn resolve_credential_id(
    store: &SqliteStore,
    user_id: &str,
    value: &str,
) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(value) {
        return Ok(id);
    }

    let prefix = value.trim().to_lowercase();
    if prefix.len() < MIN_ID_PREFIX_LEN {
        return Err(CliError::invalid_input(format!(
            "Invalid credential ID: {} (use a UUID or at least {} characters of one)",
            value, MIN_ID_PREFIX_LEN
        ))
        .into());
    }

    let matches: Vec<Uuid> = store
        .list_credentials(user_id, &CredentialFilter::new())?
        .into_iter()
        .map(|credential| credential.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(credential_not_found(value).into()),
        _ => Err(CliError::invalid_input(format!(
            "Credential ID prefix '{}' is ambiguous ({} matches)",
            value,
            matches.len()
        ))
        .into()),
    }
}

pub fn credential_not_found(id: &str) -> CliError {
    CliError::not_found(
        format!("Credential not found: {}", id),
        "Hint: Run `vault list` to find credential IDs.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::storage::NewCredential;
    use vault_core::EncryptedRecord;

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending("secret\n"), "secret");
        assert_eq!(trim_line_ending("secret\r\n"), "secret");
        assert_eq!(trim_line_ending("sec ret "), "sec ret ");
        assert_eq!(trim_line_ending("two\n\n"), "two\n");
    }

    #[test]
    fn test_resolve_credential_id_by_prefix() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store
            .insert_credential(
                "user1",
                &NewCredential::new("site", "me", EncryptedRecord::from("AAAA")),
            )
            .unwrap();
        let full = id.to_string();

        assert_eq!(resolve_credential_id(&store, "user1", &full).unwrap(), id);
        assert_eq!(
            resolve_credential_id(&store, "user1", &full[..8]).unwrap(),
            id
        );
        assert!(resolve_credential_id(&store, "user1", "ab").is_err());

        let err = resolve_credential_id(&store, "other", &full[..8]).unwrap_err();
        let cli_err = err.downcast_ref::<CliError>().unwrap();
        assert_eq!(cli_err.exit_code(), 3);
    }
}
