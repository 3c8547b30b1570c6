use std::path::PathBuf;

use crate::validation::ValidationIssue;

/// Errors raised while loading a manifest.
///
/// All of these are structural: the manifest cannot be used as-is and the
/// operation that needed it must stop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No manifest file in the given source directory.
    #[error("no instructionkit.yaml found in {0}")]
    NotFound(PathBuf),

    /// Malformed YAML or a missing required field.
    #[error("failed to parse manifest {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The manifest parsed but failed validation.
    #[error("manifest {path} is invalid:\n{}", format_issues(.issues))]
    Invalid {
        path: PathBuf,
        issues: Vec<ValidationIssue>,
    },

    /// A name was looked up that the manifest does not define.
    #[error("manifest '{manifest}' has no {kind} named '{name}'")]
    UnknownName {
        manifest: String,
        kind: &'static str,
        name: String,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, Error>;
