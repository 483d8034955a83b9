//! Path and user resolution.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, default_vault_path, VaultCliConfig};
use crate::constants::DEFAULT_USER;

/// Resolve the config file path, checking VAULT_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("VAULT_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Vault path: `--vault`/VAULT_PATH, then config, then the XDG default.
pub fn resolve_vault_path(cli: &Cli, config: Option<&VaultCliConfig>) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.vault.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(config) = config {
        return Ok(PathBuf::from(&config.vault.path));
    }
    default_vault_path()
}

/// User id: `--user`/VAULT_USER, then config, then the default user.
pub fn resolve_user_id(cli: &Cli, config: Option<&VaultCliConfig>) -> String {
    cli.user
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| config.and_then(|c| c.vault.user.as_deref()))
        .unwrap_or(DEFAULT_USER)
        .to_string()
}

/// Error message when the vault file is missing.
pub fn missing_vault_message(path: &Path) -> String {
    format!(
        "Vault not found: {}\n\nRun:\n  vault init\n\nOr specify a different path:\n  vault --vault /path/to/vault.db list",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use vault_core::VaultConfig;

    fn config() -> VaultCliConfig {
        VaultCliConfig::new(
            PathBuf::from("/data/vault.db"),
            Some("alice".to_string()),
            VaultConfig::default(),
        )
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["vault", "--vault", "/tmp/x.db", "--user", "bob", "list"]);
        let config = config();
        assert_eq!(
            resolve_vault_path(&cli, Some(&config)).unwrap(),
            PathBuf::from("/tmp/x.db")
        );
        assert_eq!(resolve_user_id(&cli, Some(&config)), "bob");
    }

    #[test]
    fn test_config_then_default_user() {
        let cli = Cli::parse_from(["vault", "list"]);
        if cli.vault.is_none() && cli.user.is_none() {
            let config = config();
            assert_eq!(
                resolve_vault_path(&cli, Some(&config)).unwrap(),
                PathBuf::from("/data/vault.db")
            );
            assert_eq!(resolve_user_id(&cli, Some(&config)), "alice");
            assert_eq!(resolve_user_id(&cli, None), DEFAULT_USER);
        }
    }
}
