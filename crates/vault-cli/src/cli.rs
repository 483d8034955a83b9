use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use vault_core::VERSION;

use crate::constants::DEFAULT_GENERATED_LENGTH;

/// Vault - A local, encrypted password vault
#[derive(Parser)]
#[command(name = "vault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the vault database
    #[arg(long, global = true, env = "VAULT_PATH")]
    pub vault: Option<String>,

    /// Vault user id
    #[arg(short, long, global = true, env = "VAULT_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug logging to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the vault will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,

    /// PBKDF2 iterations for the vault key (new vaults only)
    #[arg(long)]
    pub kdf_iterations: Option<u32>,

    /// PBKDF2 iterations for the master-secret verifier
    #[arg(long)]
    pub verifier_iterations: Option<u32>,

    /// Idle seconds before the key is dropped (0 disables)
    #[arg(long)]
    pub auto_lock_seconds: Option<u64>,

    /// Config path override
    #[arg(long)]
    pub config_path: Option<String>,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Site or service name
    #[arg(value_name = "SITE")]
    pub site: String,

    /// Account name at the site
    #[arg(value_name = "USERNAME")]
    pub username: String,

    /// Category for grouping
    #[arg(short, long)]
    pub category: Option<String>,

    /// Add tags to the credential
    #[arg(short, long, value_name = "TAG")]
    pub tag: Vec<String>,

    /// Generate a password instead of reading one
    #[arg(short, long)]
    pub generate: bool,

    /// Length of the generated password
    #[arg(long, default_value_t = DEFAULT_GENERATED_LENGTH, requires = "generate")]
    pub length: usize,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `get` command
#[derive(Args)]
pub struct GetArgs {
    /// Credential ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Filter by category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Filter by site substring (case-insensitive)
    #[arg(long)]
    pub site: Option<String>,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `remove` command
#[derive(Args)]
pub struct RemoveArgs {
    /// Credential ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `generate` command
#[derive(Args)]
pub struct GenerateArgs {
    /// Password length (12 to 1024)
    #[arg(short, long, default_value_t = DEFAULT_GENERATED_LENGTH)]
    pub length: usize,
}

/// Arguments for the `strength` command
#[derive(Args)]
pub struct StrengthArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `verify` command
#[derive(Args)]
pub struct VerifyArgs {
    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the vault for a user
    Init(InitArgs),

    /// Store a credential
    Add(AddArgs),

    /// Decrypt and show a credential
    Get(GetArgs),

    /// List credentials (metadata only, no unlock needed)
    List(ListArgs),

    /// Delete a credential
    #[command(alias = "rm")]
    Remove(RemoveArgs),

    /// Generate a secure random password
    Generate(GenerateArgs),

    /// Score a password read from stdin or a prompt
    Strength(StrengthArgs),

    /// Check the master secret without unlocking the vault
    Verify(VerifyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_length_requires_generate() {
        let result = Cli::try_parse_from(["vault", "add", "site", "me", "--length", "30"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["vault", "add", "site", "me", "-g", "--length", "30"])
            .unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert!(args.generate);
                assert_eq!(args.length, 30);
            }
            _ => panic!("expected add"),
        }
    }
}
