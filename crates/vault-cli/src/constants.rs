//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, used by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, vault, user, credential).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong master secret, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// A stored secret could not be decrypted with the unlocked key.
    pub const DECRYPTION_FAILED: i32 = 6;
}

/// Vault user when neither `--user` nor the config names one.
pub const DEFAULT_USER: &str = "default";

/// Master-secret prompts allowed per invocation on a TTY.
pub const MAX_UNLOCK_ATTEMPTS: u32 = 3;

/// Length of passwords produced by `generate` and `add --generate`.
pub const DEFAULT_GENERATED_LENGTH: usize = 20;

/// Shortest accepted credential id prefix.
pub const MIN_ID_PREFIX_LEN: usize = 4;
