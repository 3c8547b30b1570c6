//! Manifest validation.
//!
//! Every check runs and every problem is collected, so a manifest author sees
//! all of them in one pass.

use std::collections::HashSet;

use crate::dependency::DependencyGraph;
use crate::manifest::Manifest;

/// A single problem found in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("duplicate template name '{0}'")]
    DuplicateTemplate(String),

    #[error("duplicate bundle name '{0}'")]
    DuplicateBundle(String),

    #[error("duplicate MCP server name '{0}'")]
    DuplicateMcpServer(String),

    #[error("template '{0}' lists no files")]
    EmptyTemplate(String),

    #[error("template '{template}' references missing file '{path}'")]
    MissingFile { template: String, path: String },

    #[error("template '{template}' file '{path}' escapes the manifest directory")]
    UnsafePath { template: String, path: String },

    #[error("bundle '{bundle}' references unknown template '{template}'")]
    UnknownBundleTemplate { bundle: String, template: String },

    #[error("template '{template}' depends on unknown template '{dependency}'")]
    MissingDependency { template: String, dependency: String },

    #[error("dependency cycle: {}", .cycle.join(" -> "))]
    DependencyCycle {
        /// Cycle members, with the first member repeated at the end.
        cycle: Vec<String>,
    },
}

/// Run all checks against a parsed manifest.
pub fn validate(manifest: &Manifest) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    issues.extend(duplicates(
        manifest.templates.iter().map(|t| t.name.as_str()),
        ValidationIssue::DuplicateTemplate,
    ));
    issues.extend(duplicates(
        manifest.bundles.iter().map(|b| b.name.as_str()),
        ValidationIssue::DuplicateBundle,
    ));
    issues.extend(duplicates(
        manifest.mcp_servers.iter().map(|s| s.name.as_str()),
        ValidationIssue::DuplicateMcpServer,
    ));

    check_files(manifest, &mut issues);
    check_bundles(manifest, &mut issues);
    issues.extend(validate_dependencies(manifest));

    if !issues.is_empty() {
        tracing::debug!(manifest = %manifest.name, count = issues.len(), "Manifest has validation issues");
    }
    issues
}

/// Dependency checks only: unknown references and cycles.
pub fn validate_dependencies(manifest: &Manifest) -> Vec<ValidationIssue> {
    let graph = DependencyGraph::from_manifest(manifest);
    let mut issues: Vec<ValidationIssue> = graph
        .missing_dependencies()
        .into_iter()
        .map(|(template, dependency)| ValidationIssue::MissingDependency {
            template,
            dependency,
        })
        .collect();
    issues.extend(
        graph
            .find_cycles()
            .into_iter()
            .map(|cycle| ValidationIssue::DependencyCycle { cycle }),
    );
    issues
}

fn duplicates<'a, F>(names: impl Iterator<Item = &'a str>, issue: F) -> Vec<ValidationIssue>
where
    F: Fn(String) -> ValidationIssue,
{
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    names
        .filter(|name| !seen.insert(*name) && reported.insert(*name))
        .map(|name| issue(name.to_string()))
        .collect()
}

fn check_files(manifest: &Manifest, issues: &mut Vec<ValidationIssue>) {
    for template in &manifest.templates {
        if template.files.is_empty() {
            issues.push(ValidationIssue::EmptyTemplate(template.name.clone()));
        }
        for file in &template.files {
            if file.path.is_absolute() || file.path.escapes_base() {
                issues.push(ValidationIssue::UnsafePath {
                    template: template.name.clone(),
                    path: file.path.to_string(),
                });
                continue;
            }
            if !manifest.file_path(file).is_file() {
                issues.push(ValidationIssue::MissingFile {
                    template: template.name.clone(),
                    path: file.path.to_string(),
                });
            }
        }
    }
}

fn check_bundles(manifest: &Manifest, issues: &mut Vec<ValidationIssue>) {
    let known: HashSet<&str> = manifest.templates.iter().map(|t| t.name.as_str()).collect();
    for bundle in &manifest.bundles {
        for template in &bundle.templates {
            if !known.contains(template.as_str()) {
                issues.push(ValidationIssue::UnknownBundleTemplate {
                    bundle: bundle.name.clone(),
                    template: template.clone(),
                });
            }
        }
    }
}
