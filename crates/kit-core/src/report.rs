//! Outcomes of installer operations.

use std::fmt;
use std::path::PathBuf;

use kit_git::RefType;
use kit_tools::{Scope, Tool};
use serde::Serialize;

use crate::library::LibraryRepository;
use crate::tracker::InstallationRecord;

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Installed,
    Overwritten,
    Renamed,
    Skipped,
    Failed,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Overwritten => "overwritten",
            Self::Renamed => "renamed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }

    /// True when a file was written.
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Installed | Self::Overwritten | Self::Renamed)
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report entry for one (artifact, tool) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub name: String,
    pub tool: Tool,
    pub scope: Scope,
    pub status: ArtifactStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ArtifactReport {
    pub fn written(name: &str, tool: Tool, scope: Scope, status: ArtifactStatus, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            tool,
            scope,
            status,
            path: Some(path),
            backup: None,
            reason: None,
        }
    }

    pub fn skipped(name: &str, tool: Tool, scope: Scope, reason: impl Into<String>) -> Self {
        Self::not_written(name, tool, scope, ArtifactStatus::Skipped, reason.into())
    }

    pub fn failed(name: &str, tool: Tool, scope: Scope, reason: impl Into<String>) -> Self {
        Self::not_written(name, tool, scope, ArtifactStatus::Failed, reason.into())
    }

    fn not_written(name: &str, tool: Tool, scope: Scope, status: ArtifactStatus, reason: String) -> Self {
        Self {
            name: name.to_string(),
            tool,
            scope,
            status,
            path: None,
            backup: None,
            reason: Some(reason),
        }
    }
}

/// Per-artifact results of an install. Every artifact considered has exactly
/// one entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub artifacts: Vec<ArtifactReport>,
}

impl InstallReport {
    pub fn push(&mut self, entry: ArtifactReport) {
        match entry.status {
            ArtifactStatus::Failed => tracing::warn!(
                name = %entry.name,
                tool = %entry.tool,
                reason = entry.reason.as_deref().unwrap_or(""),
                "Artifact failed"
            ),
            ArtifactStatus::Skipped => tracing::info!(
                name = %entry.name,
                tool = %entry.tool,
                reason = entry.reason.as_deref().unwrap_or(""),
                "Artifact skipped"
            ),
            _ => tracing::debug!(name = %entry.name, tool = %entry.tool, status = %entry.status, "Artifact written"),
        }
        self.artifacts.push(entry);
    }

    pub fn count(&self, status: ArtifactStatus) -> usize {
        self.artifacts.iter().filter(|a| a.status == status).count()
    }

    pub fn written(&self) -> usize {
        self.artifacts.iter().filter(|a| a.status.is_written()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(ArtifactStatus::Failed) > 0
    }
}

/// Result of a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(LibraryRepository),
    /// The namespace was already in the library and `force` was not set.
    AlreadyExists(LibraryRepository),
}

impl DownloadOutcome {
    pub fn repository(&self) -> &LibraryRepository {
        match self {
            Self::Downloaded(repo) | Self::AlreadyExists(repo) => repo,
        }
    }
}

/// Result of an update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// New commits were pulled and the source re-indexed.
    Updated(LibraryRepository),
    UpToDate { namespace: String },
    /// Tags and commits are never pulled.
    Pinned {
        namespace: String,
        reference: String,
        ref_type: RefType,
        /// A higher semver tag on the remote, if any.
        newer_tag: Option<String>,
    },
}

/// One record removed by an uninstall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedArtifact {
    pub record: InstallationRecord,
    /// False when the file (or MCP entry) was already gone.
    pub artifact_removed: bool,
}
