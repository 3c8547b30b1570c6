//! Error types for kit-core

use std::path::PathBuf;

/// Result type for kit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kit-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Project-scoped work was requested outside any project
    #[error(
        "No project root found from {start} (looked for .git, pyproject.toml, package.json, Cargo.toml, go.mod, pom.xml, build.gradle)"
    )]
    ProjectRootNotFound { start: PathBuf },

    /// The user's home directory could not be determined
    #[error("Could not determine the home directory")]
    HomeDirNotFound,

    /// Namespace not present in the library
    #[error("Namespace '{0}' is not in the library (run `kit download` first)")]
    UnknownNamespace(String),

    /// Namespace that would not map to one directory inside the library
    #[error("Invalid namespace '{0}': must be a single directory name")]
    InvalidNamespace(String),

    /// Environment variable name not usable in a dotenv file
    #[error("Invalid environment variable name '{0}'")]
    InvalidEnvKey(String),

    /// Environment value that cannot be stored on one dotenv line
    #[error("Value for '{key}' cannot contain line breaks or control characters")]
    InvalidEnvValue { key: String },

    /// Environment file exists but cannot be parsed
    #[error("Failed to read environment file {path}: {message}")]
    EnvFile { path: PathBuf, message: String },

    /// Unrecognized conflict strategy name
    #[error("Invalid conflict strategy '{0}' (expected skip, rename or overwrite)")]
    InvalidStrategy(String),

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from kit-fs
    #[error(transparent)]
    Fs(#[from] kit_fs::Error),

    /// Git error from kit-git
    #[error(transparent)]
    Git(#[from] kit_git::Error),

    /// Manifest error from kit-manifest
    #[error(transparent)]
    Manifest(#[from] kit_manifest::Error),

    /// Tools error from kit-tools
    #[error(transparent)]
    Tools(#[from] kit_tools::Error),
}
