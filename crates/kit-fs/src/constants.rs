//! Well-known file and directory names.

use std::path::Path;

/// Directory holding InstructionKit state, both under the user's home and
/// under a project root.
pub const KIT_DIR: &str = ".instructionkit";

/// Installation tracking file name inside [`KIT_DIR`].
pub const INSTALLATIONS_FILE: &str = "installations.json";

/// Files or directories whose presence marks a project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectMarker {
    /// The `.git` directory (or file, for worktrees)
    GitDir,
    /// Python `pyproject.toml`
    PyProject,
    /// Node `package.json`
    PackageJson,
    /// Rust `Cargo.toml`
    CargoToml,
    /// Go `go.mod`
    GoMod,
    /// Maven `pom.xml`
    PomXml,
    /// Gradle `build.gradle`
    BuildGradle,
}

impl ProjectMarker {
    /// All markers, in the order they are probed.
    pub const ALL: [ProjectMarker; 7] = [
        Self::GitDir,
        Self::PyProject,
        Self::PackageJson,
        Self::CargoToml,
        Self::GoMod,
        Self::PomXml,
        Self::BuildGradle,
    ];

    /// Get the string representation of the marker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitDir => ".git",
            Self::PyProject => "pyproject.toml",
            Self::PackageJson => "package.json",
            Self::CargoToml => "Cargo.toml",
            Self::GoMod => "go.mod",
            Self::PomXml => "pom.xml",
            Self::BuildGradle => "build.gradle",
        }
    }
}

impl AsRef<Path> for ProjectMarker {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for ProjectMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
