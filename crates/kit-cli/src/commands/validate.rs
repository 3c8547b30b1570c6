//! Validate command implementation

use std::path::Path;

use colored::Colorize;
use kit_manifest::Manifest;

use crate::error::Result;

/// Run the validate command
///
/// Accepts the manifest file itself or the directory holding it. Validation
/// issues come back as the error; size advisories are printed as warnings.
pub fn run_validate(path: &Path) -> Result<()> {
    let manifest = if path.is_dir() {
        Manifest::load_from_dir(path)?
    } else {
        Manifest::load(path)?
    };

    for warning in manifest.size_warnings() {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    println!(
        "{} {} v{} is valid: {} templates, {} bundles, {} MCP servers",
        "OK".green().bold(),
        manifest.name.cyan(),
        manifest.version,
        manifest.templates.len(),
        manifest.bundles.len(),
        manifest.mcp_servers.len()
    );
    Ok(())
}
