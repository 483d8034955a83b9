//! Vault CLI - A local, encrypted password vault
//!
//! This is the command-line interface for Vault. Every invocation is one
//! session: unlock, act, lock.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;

use clap::Parser;
use vault_core::{VaultError, VERSION};

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{credentials, init, tools};
use crate::errors::CliError;
use crate::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let ctx = AppContext::new(&cli);

    if let Err(err) = run(&ctx, &cli) {
        exit_with_error(err);
    }
}

fn exit_with_error(err: anyhow::Error) -> ! {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        cli_err.exit()
    }
    if let Some(cli_err) = err
        .downcast_ref::<VaultError>()
        .and_then(CliError::from_vault_error)
    {
        cli_err.exit()
    }
    eprintln!("Error: {:#}", err);
    std::process::exit(1)
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => {
            init::handle_init(ctx, args)?;
        }
        Some(Commands::Add(args)) => {
            credentials::handle_add(ctx, args)?;
        }
        Some(Commands::Get(args)) => {
            credentials::handle_get(ctx, args)?;
        }
        Some(Commands::List(args)) => {
            credentials::handle_list(ctx, args)?;
        }
        Some(Commands::Remove(args)) => {
            credentials::handle_remove(ctx, args)?;
        }
        Some(Commands::Generate(args)) => {
            tools::handle_generate(args)?;
        }
        Some(Commands::Strength(args)) => {
            tools::handle_strength(ctx, args)?;
        }
        Some(Commands::Verify(args)) => {
            tools::handle_verify(ctx, args)?;
        }
        Some(Commands::Completions(args)) => {
            tools::handle_completions(args)?;
        }
        None => {
            println!("Vault v{}", VERSION);
            println!("\nQuickstart:");
            println!("  vault init");
            println!("  vault add github.com octocat --generate");
            println!("  vault list");
            println!("  vault get <id>");
            println!("\nRun `vault --help` for full usage.");
        }
    }

    Ok(())
}
