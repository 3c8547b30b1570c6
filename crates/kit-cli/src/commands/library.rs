//! Library commands: download, list and update sources

use colored::Colorize;
use kit_core::{DownloadOutcome, Installer, LibraryRepository, UpdateOutcome};

use crate::error::Result;

/// Run the download command
pub fn run_download(
    installer: &Installer<'_>,
    url: &str,
    reference: Option<&str>,
    alias: Option<&str>,
    force: bool,
) -> Result<()> {
    match installer.download(url, reference, alias, force)? {
        DownloadOutcome::Downloaded(repository) => {
            println!(
                "{} Downloaded {} ({} instructions)",
                "OK".green().bold(),
                repository.namespace.cyan(),
                repository.instructions.len()
            );
            print_instructions(&repository);
        }
        DownloadOutcome::AlreadyExists(repository) => {
            println!(
                "{} {} is already in the library (use {} to re-download)",
                "=".dimmed(),
                repository.namespace.cyan(),
                "--force".cyan()
            );
        }
    }
    Ok(())
}

fn print_instructions(repository: &LibraryRepository) {
    for instruction in &repository.instructions {
        println!(
            "  {} {} {}",
            "+".green(),
            instruction.name,
            instruction.file_path.as_str().dimmed()
        );
    }
}

/// Run the library command
pub fn run_library(installer: &Installer<'_>, json: bool) -> Result<()> {
    let repositories = installer.library().list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&repositories)?);
        return Ok(());
    }

    if repositories.is_empty() {
        println!(
            "{} (use {} to add a source)",
            "Library is empty".dimmed(),
            "kit download <url>".cyan()
        );
        return Ok(());
    }

    println!("{}", "Library".bold());
    println!();
    for repository in &repositories {
        let reference = repository
            .reference
            .as_deref()
            .map(|r| format!(" @ {r}"))
            .unwrap_or_default();
        println!(
            "  {:<28} {} v{}{}",
            repository.namespace.green(),
            repository.name,
            repository.version,
            reference.dimmed()
        );
        if !repository.description.is_empty() {
            println!("  {:<28} {}", "", repository.description.dimmed());
        }
        println!("  {:<28} {} instructions", "", repository.instructions.len());
    }
    Ok(())
}

/// Run the update command
pub fn run_update(installer: &Installer<'_>, namespace: &str) -> Result<()> {
    match installer.update(namespace)? {
        UpdateOutcome::Updated(repository) => {
            println!("{} Updated {}", "OK".green().bold(), repository.namespace.cyan());
            print_instructions(&repository);
        }
        UpdateOutcome::UpToDate { namespace } => {
            println!("{} {} is up to date", "=".dimmed(), namespace.cyan());
        }
        UpdateOutcome::Pinned {
            namespace,
            reference,
            ref_type,
            newer_tag,
        } => {
            println!(
                "{} {} is pinned to {} {}",
                "=".dimmed(),
                namespace.cyan(),
                ref_type,
                reference.yellow()
            );
            if let Some(tag) = newer_tag {
                println!(
                    "  Newer tag available: {} (run {})",
                    tag.green(),
                    format!("kit download <url> --ref {tag}").cyan()
                );
            }
        }
    }
    Ok(())
}
