//! Isolated home and project directories.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary home directory plus a project directory marked with `.git`.
///
/// ```text
/// <tmp>/home/                  user home
/// <tmp>/home/.instructionkit/  kit home
/// <tmp>/project/.git/          project marker
/// ```
pub struct Sandbox {
    temp_dir: TempDir,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// # Panics
    /// Panics if the directories cannot be created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap_or_else(|e| panic!("Sandbox: tempdir failed: {e}"));
        for dir in ["home", "project/.git"] {
            fs::create_dir_all(temp_dir.path().join(dir))
                .unwrap_or_else(|e| panic!("Sandbox: failed to create {dir}: {e}"));
        }
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn home(&self) -> PathBuf {
        self.root().join("home")
    }

    pub fn kit_home(&self) -> PathBuf {
        self.home().join(".instructionkit")
    }

    pub fn project(&self) -> PathBuf {
        self.root().join("project")
    }

    /// Write a file relative to the project root.
    pub fn write_project_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.project().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|e| panic!("Sandbox: mkdir failed: {e}"));
        }
        fs::write(&path, content).unwrap_or_else(|e| panic!("Sandbox: write failed: {e}"));
        path
    }

    /// Assert that `path` (relative to the project root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_project_file_contains(&self, relative: &str, content: &str) {
        let path = self.project().join(relative);
        let actual = fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()));
        assert!(
            actual.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path.display(),
            content,
            actual
        );
    }
}
