use vault_core::storage::{CredentialFilter, NewCredential};
use vault_core::{calculate_strength, generate_secure_password, StrengthLevel};
use zeroize::Zeroizing;

use crate::app::AppContext;
use crate::cli::{AddArgs, GetArgs, ListArgs, RemoveArgs};
use crate::helpers::{
    confirm, credential_not_found, is_interactive, read_password_input, resolve_credential_id,
};
use crate::output::{credential_json, credential_text, credentials_json, credentials_table};

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let user_id = vault.user_id()?;

    let password = if args.generate {
        Zeroizing::new(generate_secure_password(args.length)?)
    } else {
        read_password_input(&format!("Password for {}", args.site), true)?
    };

    let level = StrengthLevel::from_score(calculate_strength(&password));
    if !args.generate && level == StrengthLevel::Weak && !ctx.quiet() {
        eprintln!("Warning: this password is weak. Try `vault generate`.");
    }

    let secret = vault.encrypt_password(&password)?;
    let mut credential = NewCredential::new(args.site.clone(), args.username.clone(), secret)
        .with_tags(args.tag.clone());
    if let Some(category) = &args.category {
        credential = credential.with_category(category.clone());
    }
    let id = vault.store().insert_credential(&user_id, &credential)?;

    if ctx.quiet() {
        println!("{}", id);
    } else {
        println!("Added credential {}", id);
        if args.generate {
            println!("Password: {}", password.as_str());
        }
    }
    Ok(())
}

pub fn handle_get(ctx: &AppContext, args: &GetArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let user_id = vault.user_id()?;

    let id = resolve_credential_id(vault.store(), &user_id, &args.id)?;
    let credential = vault
        .store()
        .get_credential(&user_id, &id)?
        .ok_or_else(|| credential_not_found(&args.id))?;
    let password = vault.decrypt_password(&credential.secret)?;

    if args.json {
        let value = credential_json(&credential, Some(password.as_str()));
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if ctx.quiet() {
        println!("{}", password.as_str());
    } else {
        println!("{}", credential_text(&credential, &password));
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let user_id = ctx.user_id()?;

    let mut filter = CredentialFilter::new();
    if let Some(category) = &args.category {
        filter = filter.category(category.clone());
    }
    if let Some(site) = &args.site {
        filter = filter.site_contains(site.clone());
    }
    if let Some(limit) = args.limit {
        filter = filter.limit(limit);
    }
    let credentials = store.list_credentials(&user_id, &filter)?;

    if args.json {
        let value = serde_json::Value::Array(credentials_json(&credentials));
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if credentials.is_empty() {
        if !ctx.quiet() {
            println!("No credentials found.");
        }
        return Ok(());
    }

    if ctx.quiet() {
        for credential in &credentials {
            println!("{}\t{}\t{}", credential.id, credential.site, credential.username);
        }
    } else {
        println!("{}", credentials_table(&credentials));
    }
    Ok(())
}

pub fn handle_remove(ctx: &AppContext, args: &RemoveArgs) -> anyhow::Result<()> {
    let vault = ctx.unlock(args.no_input)?;
    let user_id = vault.user_id()?;

    let id = resolve_credential_id(vault.store(), &user_id, &args.id)?;
    let credential = vault
        .store()
        .get_credential(&user_id, &id)?
        .ok_or_else(|| credential_not_found(&args.id))?;

    if !args.yes {
        let prompt = format!(
            "Delete {} ({})?",
            credential.site, credential.username
        );
        if !confirm(&prompt, is_interactive(args.no_input))? {
            if !ctx.quiet() {
                println!("Cancelled.");
            }
            return Ok(());
        }
    }

    if !vault.store().delete_credential(&user_id, &id)? {
        return Err(credential_not_found(&args.id).into());
    }
    if !ctx.quiet() {
        println!("Removed credential {}", id);
    }
    Ok(())
}
