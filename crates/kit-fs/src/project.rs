//! Project root detection
//!
//! Walks up from a starting directory to the nearest ancestor carrying a
//! [`ProjectMarker`]. There is no fallback: callers that need a project root
//! must handle `None` explicitly instead of silently using the home directory.

use std::path::{Path, PathBuf};

use crate::ProjectMarker;

/// Find the nearest ancestor of `start` (inclusive) containing a project marker.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let start = dunce::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());

    for dir in start.ancestors() {
        if let Some(marker) = detect_marker(dir) {
            tracing::debug!(root = %dir.display(), %marker, "Detected project root");
            return Some(dir.to_path_buf());
        }
    }

    tracing::debug!(start = %start.display(), "No project marker found");
    None
}

/// Return the first marker present directly in `dir`.
pub fn detect_marker(dir: &Path) -> Option<ProjectMarker> {
    ProjectMarker::ALL
        .into_iter()
        .find(|marker| dir.join(marker.as_str()).exists())
}
