use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vault_core::VaultConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct VaultCliConfig {
    pub vault: VaultSection,
    #[serde(default)]
    pub security: VaultConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VaultSection {
    pub path: String,
    #[serde(default)]
    pub user: Option<String>,
}

impl VaultCliConfig {
    pub fn new(vault_path: PathBuf, user: Option<String>, security: VaultConfig) -> Self {
        Self {
            vault: VaultSection {
                path: vault_path.to_string_lossy().to_string(),
                user,
            },
            security,
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_vault_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("vault.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<VaultCliConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: VaultCliConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    config
        .security
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &VaultCliConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("vault"));
        }
    }
    Ok(home_dir()?.join(".config").join("vault"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("vault"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("vault"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault").join("config.toml");
        let security = VaultConfig {
            kdf_iterations: 200_000,
            ..VaultConfig::default()
        };
        let config = VaultCliConfig::new(
            PathBuf::from("/tmp/vault.db"),
            Some("alice".to_string()),
            security.clone(),
        );

        write_config(&path, &config).unwrap();
        let loaded = read_config(&path).unwrap();
        assert_eq!(loaded.vault.path, "/tmp/vault.db");
        assert_eq!(loaded.vault.user.as_deref(), Some("alice"));
        assert_eq!(loaded.security, security);
    }

    #[test]
    fn test_security_section_is_optional() {
        let config: VaultCliConfig = toml::from_str("[vault]\npath = \"/tmp/v.db\"\n").unwrap();
        assert_eq!(config.security, VaultConfig::default());
        assert!(config.vault.user.is_none());
    }

    #[test]
    fn test_unsafe_iterations_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[vault]\npath = \"/tmp/v.db\"\n\n[security]\nkdf_iterations = 10\n",
        )
        .unwrap();
        let err = read_config(&path).unwrap_err();
        assert!(err.to_string().contains("kdf_iterations"));
    }
}
