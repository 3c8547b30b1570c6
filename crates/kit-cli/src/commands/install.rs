//! Install, list and uninstall artifacts

use colored::{ColoredString, Colorize};
use kit_core::{ArtifactReport, ArtifactStatus, InstallReport, InstallRequest, Installer};
use kit_tools::{Scope, Tool};

use crate::error::{CliError, Result};

/// Run the install command
///
/// Fails after printing the report when any artifact failed.
pub fn run_install(
    installer: &Installer<'_>,
    request: &InstallRequest,
    mcp_servers: &[String],
    json: bool,
) -> Result<()> {
    let mut report = installer.install(request)?;
    for server in mcp_servers {
        for &tool in &request.tools {
            let entry = installer
                .install_mcp_server(&request.namespace, server, tool, request.scope)
                .unwrap_or_else(|e| ArtifactReport::failed(server, tool, request.scope, e.to_string()));
            report.push(entry);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    let failed = report.count(ArtifactStatus::Failed);
    if failed > 0 {
        return Err(CliError::user(format!("{failed} artifact(s) failed to install")));
    }
    Ok(())
}

fn print_report(report: &InstallReport) {
    for entry in &report.artifacts {
        let detail = match (&entry.path, &entry.reason) {
            (_, Some(reason)) => reason.clone(),
            (Some(path), None) => path.display().to_string(),
            (None, None) => String::new(),
        };
        println!(
            "  {} {:<20} {:<9} {}",
            status_marker(entry.status),
            entry.name,
            entry.tool.slug(),
            detail.dimmed()
        );
        if let Some(backup) = &entry.backup {
            println!("  {:<32} backup: {}", "", backup.display().to_string().dimmed());
        }
    }
    println!();
    println!(
        "{} {} written, {} skipped, {} failed",
        "Summary:".bold(),
        report.written(),
        report.count(ArtifactStatus::Skipped),
        report.count(ArtifactStatus::Failed)
    );
}

fn status_marker(status: ArtifactStatus) -> ColoredString {
    match status {
        ArtifactStatus::Installed => "+".green(),
        ArtifactStatus::Overwritten => "~".yellow(),
        ArtifactStatus::Renamed => ">".cyan(),
        ArtifactStatus::Skipped => "-".dimmed(),
        ArtifactStatus::Failed => "x".red().bold(),
    }
}

/// Run the installed command
pub fn run_installed(installer: &Installer<'_>, scope: Option<Scope>, json: bool) -> Result<()> {
    let mut records = installer.tracker().list(scope)?;
    records.sort_by(|a, b| {
        (a.scope.as_str(), &a.instruction_name, a.ai_tool.slug())
            .cmp(&(b.scope.as_str(), &b.instruction_name, b.ai_tool.slug()))
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "Nothing installed".dimmed());
        return Ok(());
    }

    println!("{}", "Installed".bold());
    println!();
    for record in &records {
        let source = record.namespace.as_deref().unwrap_or(&record.source_repo);
        println!(
            "  {:<20} {:<9} {:<8} {} {}",
            record.instruction_name.green(),
            record.ai_tool.slug(),
            record.scope.as_str(),
            source.cyan(),
            record.installed_path.display().to_string().dimmed()
        );
    }
    Ok(())
}

/// Run the uninstall command
pub fn run_uninstall(installer: &Installer<'_>, name: &str, tool: Option<Tool>, scope: Scope) -> Result<()> {
    let removed = installer.uninstall(name, tool, scope)?;
    if removed.is_empty() {
        return Err(CliError::user(format!("'{name}' is not installed in {scope} scope")));
    }

    for artifact in &removed {
        let note = if artifact.artifact_removed {
            String::new()
        } else {
            " (already gone)".to_string()
        };
        println!(
            "  {} {} {} {}{}",
            "-".red(),
            artifact.record.instruction_name,
            artifact.record.ai_tool.slug(),
            artifact.record.installed_path.display().to_string().dimmed(),
            note.dimmed()
        );
    }
    println!("{} Removed {} record(s)", "OK".green().bold(), removed.len());
    Ok(())
}
