//! Password strength scoring, secure generation, and master-secret policy.

use zeroize::Zeroizing;

use crate::crypto::random::random_index;
use crate::error::{Result, VaultError};

/// Minimum master secret length in characters.
const MIN_MASTER_SECRET_LENGTH: usize = 8;

/// Shortest password the generator will produce.
pub const MIN_GENERATED_LENGTH: usize = 12;

/// Longest password the generator will produce.
pub const MAX_GENERATED_LENGTH: usize = 1024;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?";

/// Substrings that make a password easy to guess (matched case-insensitively).
const PENALIZED_PATTERNS: &[(&str, u32)] =
    &[("password", 20), ("123", 10), ("abc", 10), ("qwerty", 10)];

/// Coarse strength bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StrengthLevel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=39 => StrengthLevel::Weak,
            40..=59 => StrengthLevel::Fair,
            60..=79 => StrengthLevel::Good,
            _ => StrengthLevel::Strong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrengthLevel::Weak => "weak",
            StrengthLevel::Fair => "fair",
            StrengthLevel::Good => "good",
            StrengthLevel::Strong => "strong",
        }
    }
}

/// Score a password from 0 to 100.
///
/// Credit is given for length milestones (8, 12, 16 characters) and for each
/// character class present; common patterns are penalized. Pure and
/// deterministic.
///
/// # Examples
///
/// ```
/// use vault_core::calculate_strength;
///
/// assert!(calculate_strength("123") < calculate_strength("Password123"));
/// assert!(calculate_strength("Password123") < calculate_strength("MySecurePassword123!@#"));
/// ```
pub fn calculate_strength(password: &str) -> u32 {
    let length = password.chars().count();
    let mut score: u32 = 0;

    if length >= 8 {
        score += 25;
    }
    if length >= 12 {
        score += 15;
    }
    if length >= 16 {
        score += 10;
    }

    if password.chars().any(char::is_lowercase) {
        score += 10;
    }
    if password.chars().any(char::is_uppercase) {
        score += 10;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 10;
    }
    if password.chars().any(is_symbol) {
        score += 20;
    }

    score.saturating_sub(pattern_penalty(password)).min(100)
}

fn is_symbol(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

fn pattern_penalty(password: &str) -> u32 {
    let lowered = Zeroizing::new(password.to_lowercase());
    PENALIZED_PATTERNS
        .iter()
        .filter(|(pattern, _)| lowered.contains(pattern))
        .map(|(_, penalty)| penalty)
        .sum()
}

/// Generate a random password of `length` characters.
///
/// The result always contains a lowercase letter, an uppercase letter, a digit
/// and a symbol, and never contains a penalized pattern, so it scores
/// [`StrengthLevel::Strong`].
///
/// # Errors
///
/// Returns `VaultError::InvalidInput` if `length` is outside
/// [`MIN_GENERATED_LENGTH`]..=[`MAX_GENERATED_LENGTH`], or
/// `VaultError::RandomSourceUnavailable` if the secure source fails.
pub fn generate_secure_password(length: usize) -> Result<String> {
    if !(MIN_GENERATED_LENGTH..=MAX_GENERATED_LENGTH).contains(&length) {
        return Err(VaultError::InvalidInput(format!(
            "Generated password length must be between {} and {} (got {})",
            MIN_GENERATED_LENGTH, MAX_GENERATED_LENGTH, length
        )));
    }

    loop {
        let candidate = generate_candidate(length)?;
        if pattern_penalty(&candidate) == 0 {
            return Ok(candidate);
        }
    }
}

fn generate_candidate(length: usize) -> Result<String> {
    let classes = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS];
    let mut chars: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(length));

    for class in classes {
        chars.push(class[random_index(class.len())?]);
    }

    let all: Vec<u8> = classes.concat();
    while chars.len() < length {
        chars.push(all[random_index(all.len())?]);
    }

    // Fisher-Yates, so the guaranteed characters are not always up front.
    for i in (1..chars.len()).rev() {
        let j = random_index(i + 1)?;
        chars.swap(i, j);
    }

    // Every byte comes from the ASCII tables above.
    Ok(chars.iter().map(|b| *b as char).collect())
}

/// Validate that a master secret meets minimum requirements.
///
/// # Requirements
///
/// - Not empty or only whitespace
/// - At least 8 characters long
///
/// # Examples
///
/// ```
/// use vault_core::validate_master_secret;
///
/// assert!(validate_master_secret("Secret123!").is_ok());
/// assert!(validate_master_secret("short").is_err());
/// ```
pub fn validate_master_secret(secret: &str) -> Result<()> {
    if secret.trim().is_empty() {
        return Err(VaultError::InvalidInput(
            "Master secret cannot be empty".to_string(),
        ));
    }

    let length = secret.chars().count();
    if length < MIN_MASTER_SECRET_LENGTH {
        return Err(VaultError::InvalidInput(format!(
            "Master secret must be at least {} characters (got {})",
            MIN_MASTER_SECRET_LENGTH, length
        )));
    }

    Ok(())
}
