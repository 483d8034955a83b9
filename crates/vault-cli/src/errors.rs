//! CLI error types for structured error handling.
//!
//! Typed errors that map to specific exit codes. Core errors are translated
//! here so every command reports them the same way.

use std::fmt;

use vault_core::VaultError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, vault, user, credential)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong master secret, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Stored secret does not decrypt under the unlocked key
    DecryptionFailed { message: String, hint: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } | CliError::DecryptionFailed { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error without a hint.
    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: None,
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Translate a core error, if it has a dedicated exit code.
    pub fn from_vault_error(err: &VaultError) -> Option<Self> {
        let mapped = match err {
            VaultError::InvalidCredentials => CliError::auth_failed("Incorrect master secret."),
            VaultError::NotInitialized(user) => CliError::not_found(
                format!("No vault exists for user '{}'.", user),
                "Hint: Run `vault init --user <ID>` to create one.",
            ),
            VaultError::AlreadyInitialized(user) => CliError::invalid_input(format!(
                "A vault already exists for user '{}'.",
                user
            )),
            VaultError::DecryptionFailed(_) => CliError::DecryptionFailed {
                message: "Decryption failed.".to_string(),
                hint: "Hint: The record was not written by this user's vault key, or it was modified."
                    .to_string(),
            },
            VaultError::InvalidInput(message) | VaultError::Config(message) => {
                CliError::invalid_input(message.clone())
            }
            _ => return None,
        };
        Some(mapped)
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::DecryptionFailed { .. } => exit_codes::DECRYPTION_FAILED,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}
