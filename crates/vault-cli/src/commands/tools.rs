use clap::CommandFactory;
use clap_complete::generate;
use vault_core::{calculate_strength, generate_secure_password, StrengthLevel, VaultKeyManager};

use crate::app::AppContext;
use crate::cli::{Cli, CompletionsArgs, GenerateArgs, StrengthArgs, VerifyArgs};
use crate::errors::CliError;
use crate::helpers::{is_interactive, prompt_master_secret, read_password_input};
use crate::output::strength_json;

pub fn handle_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let password = generate_secure_password(args.length)?;
    println!("{}", password);
    Ok(())
}

pub fn handle_strength(ctx: &AppContext, args: &StrengthArgs) -> anyhow::Result<()> {
    let password = read_password_input("Password to score", false)?;
    let score = calculate_strength(&password);
    let level = StrengthLevel::from_score(score);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&strength_json(score, level))?);
    } else if ctx.quiet() {
        println!("{}", score);
    } else {
        println!("Score: {}/100", score);
        println!("Strength: {}", level.label());
    }
    Ok(())
}

/// Check the master secret against the stored verifier without deriving a key.
pub fn handle_verify(ctx: &AppContext, args: &VerifyArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let user_id = ctx.user_id()?;
    let manager = VaultKeyManager::new(store.clone(), &ctx.vault_config(&store)?)?;

    let secret = prompt_master_secret(is_interactive(args.no_input))?;
    if !manager.verify_master_secret(&secret, &user_id)? {
        return Err(CliError::auth_failed("Incorrect master secret.").into());
    }
    if !ctx.quiet() {
        println!("Master secret verified for user '{}'.", user_id);
    }
    Ok(())
}

pub fn handle_completions(args: &CompletionsArgs) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "vault", &mut std::io::stdout());
    Ok(())
}
