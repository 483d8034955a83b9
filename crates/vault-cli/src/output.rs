//! Output formatting helpers for the CLI.
//!
//! JSON shapes for scripting and comfy-table rendering for humans.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use vault_core::storage::Credential;
use vault_core::StrengthLevel;

/// Convert a credential to JSON for output.
///
/// The decrypted password is included only when given.
pub fn credential_json(credential: &Credential, password: Option<&str>) -> serde_json::Value {
    let mut value = serde_json::json!({
        "id": credential.id,
        "site": credential.site,
        "username": credential.username,
        "category": credential.category,
        "tags": credential.tags,
        "created_at": credential.created_at,
        "updated_at": credential.updated_at,
    });
    if let Some(password) = password {
        value["password"] = serde_json::Value::String(password.to_string());
    }
    value
}

/// Convert multiple credentials to a JSON array (metadata only).
pub fn credentials_json(credentials: &[Credential]) -> Vec<serde_json::Value> {
    credentials
        .iter()
        .map(|credential| credential_json(credential, None))
        .collect()
}

/// Render credentials as a table.
pub fn credentials_table(credentials: &[Credential]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Site", "Username", "Category", "Tags", "Updated"]);
    for credential in credentials {
        table.add_row(vec![
            short_id(&credential.id.to_string()),
            credential.site.clone(),
            credential.username.clone(),
            credential.category.clone().unwrap_or_default(),
            credential.tags.join(", "),
            credential.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table
}

/// Plain-text rendering of one decrypted credential.
pub fn credential_text(credential: &Credential, password: &str) -> String {
    let mut lines = vec![
        format!("ID: {}", credential.id),
        format!("Site: {}", credential.site),
        format!("Username: {}", credential.username),
    ];
    if let Some(category) = &credential.category {
        lines.push(format!("Category: {}", category));
    }
    if !credential.tags.is_empty() {
        lines.push(format!("Tags: {}", credential.tags.join(", ")));
    }
    lines.push(format!("Password: {}", password));
    lines.join("\n")
}

pub fn strength_json(score: u32, level: StrengthLevel) -> serde_json::Value {
    serde_json::json!({
        "score": score,
        "level": level.label(),
    })
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
