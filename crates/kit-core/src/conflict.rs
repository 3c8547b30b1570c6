//! Install-time conflict resolution.
//!
//! Deciding what to do with an existing target is separated from doing it:
//! [`resolve`] only inspects the disk to find a free rename slot and never
//! writes anything.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// What to do when an install target already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Leave the existing file alone; nothing is written.
    #[default]
    Skip,
    /// Write next to the existing file under the first free `<stem>-<n><ext>`.
    Rename,
    /// Replace the existing file.
    Overwrite,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Rename => "rename",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "rename" => Ok(Self::Rename),
            "overwrite" => Ok(Self::Overwrite),
            _ => Err(Error::InvalidStrategy(s.to_string())),
        }
    }
}

/// The decision for one conflicting artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictInfo {
    /// Artifact identity the conflict concerns.
    pub identity: String,
    pub existing_path: PathBuf,
    pub resolution: ConflictStrategy,
    /// Where to write. `None` for [`ConflictStrategy::Skip`].
    pub new_path: Option<PathBuf>,
}

/// Decide how to install `identity` at `target` under `strategy`.
pub fn resolve(identity: &str, target: &Path, strategy: ConflictStrategy) -> ConflictInfo {
    let new_path = match strategy {
        ConflictStrategy::Skip => None,
        ConflictStrategy::Overwrite => Some(target.to_path_buf()),
        ConflictStrategy::Rename => Some(rename_target(target)),
    };
    tracing::debug!(
        identity,
        target = %target.display(),
        resolution = %strategy,
        "Resolved install conflict"
    );
    ConflictInfo {
        identity: identity.to_string(),
        existing_path: target.to_path_buf(),
        resolution: strategy,
        new_path,
    }
}

/// Like [`resolve`], but `None` when `target` does not exist.
pub fn plan(identity: &str, target: &Path, strategy: ConflictStrategy) -> Option<ConflictInfo> {
    target
        .exists()
        .then(|| resolve(identity, target, strategy))
}

/// First `<stem>-<n><ext>` beside `target` (n = 1, 2, ...) that does not exist.
pub fn rename_target(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1u32..)
        .map(|n| target.with_file_name(format!("{stem}-{n}{extension}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| target.to_path_buf())
}
