//! Credential commands for MCP servers

use colored::Colorize;
use kit_core::Installer;
use kit_manifest::Manifest;
use kit_tools::Scope;

use crate::error::{CliError, Result};

pub fn run_env_set(installer: &Installer<'_>, scope: Scope, key: &str, value: &str) -> Result<()> {
    installer.environment().set(scope, key, value)?;
    let path = installer.environment().path(scope)?;
    println!("{} Set {} in {}", "OK".green().bold(), key.cyan(), path.display());
    Ok(())
}

pub fn run_env_unset(installer: &Installer<'_>, scope: Scope, key: &str) -> Result<()> {
    if !installer.environment().unset(scope, key)? {
        return Err(CliError::user(format!("{key} is not set in {scope} scope")));
    }
    println!("{} Removed {}", "OK".green().bold(), key.cyan());
    Ok(())
}

/// Print variable names; values are masked.
pub fn run_env_list(installer: &Installer<'_>, scope: Option<Scope>) -> Result<()> {
    let env = installer.environment();
    let vars = match scope {
        Some(scope) => env.load(scope)?,
        None => env.merge()?,
    };

    if vars.is_empty() {
        println!("{}", "No variables set".dimmed());
        return Ok(());
    }
    for (key, value) in &vars {
        println!("  {:<24} {}", key.green(), mask(value).dimmed());
    }
    Ok(())
}

fn mask(value: &str) -> String {
    if value.chars().count() <= 8 {
        return "****".to_string();
    }
    let visible: String = value.chars().take(4).collect();
    format!("{visible}****")
}

/// Report which credentials an MCP server still needs.
pub fn run_env_check(installer: &Installer<'_>, namespace: &str, server: &str) -> Result<()> {
    if !installer.library().contains(namespace)? {
        return Err(kit_core::Error::UnknownNamespace(namespace.to_string()).into());
    }
    let manifest = Manifest::load_from_dir(&installer.library().source_dir(namespace)?)?;
    let definition = manifest.mcp_server(server).ok_or_else(|| kit_manifest::Error::UnknownName {
        manifest: manifest.name.clone(),
        kind: "MCP server",
        name: server.to_string(),
    })?;

    let missing = installer
        .environment()
        .validate_for_server(&definition.required_vars())?;
    if missing.is_empty() {
        println!("{} {} has every credential it needs", "OK".green().bold(), server.cyan());
        return Ok(());
    }

    for key in &missing {
        println!("  {} {}", "missing".red(), key);
    }
    Err(CliError::user(format!(
        "{server} is missing {} credential(s); set them with `kit env set <KEY> <VALUE>`",
        missing.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_are_fully_masked() {
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("12345678"), "****");
    }

    #[test]
    fn long_values_show_a_prefix() {
        assert_eq!(mask("ghp_abcdefghij"), "ghp_****");
    }
}
