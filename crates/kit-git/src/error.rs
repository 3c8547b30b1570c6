//! Error types for kit-git

use std::path::PathBuf;

/// Result type for kit-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kit-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Authentication failed for {url}: {message}. Check your SSH keys or credential helper.")]
    Auth { url: String, message: String },

    #[error("Network error reaching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid namespace '{value}': {reason}")]
    InvalidNamespace { value: String, reason: String },

    #[error("Cannot derive a namespace from URL '{url}'")]
    InvalidUrl { url: String },

    #[error("Reference '{reference}' not found in {path}")]
    RefNotFound { reference: String, path: PathBuf },

    #[error("Cannot fast-forward {path}; local history has diverged from the remote")]
    NotFastForward { path: PathBuf },
}

impl Error {
    /// Classify a libgit2 error raised while talking to `url`.
    pub fn from_remote(url: &str, err: git2::Error) -> Self {
        if err.code() == git2::ErrorCode::Auth {
            return Self::Auth {
                url: url.to_string(),
                message: err.message().to_string(),
            };
        }
        match err.class() {
            git2::ErrorClass::Net
            | git2::ErrorClass::Http
            | git2::ErrorClass::Ssl
            | git2::ErrorClass::Ssh => Self::Network {
                url: url.to_string(),
                message: err.message().to_string(),
            },
            _ => Self::Git(err),
        }
    }

    /// True for failures the user can fix by adjusting credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// True for connectivity failures.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
