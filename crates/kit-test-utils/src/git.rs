//! Source repositories backed by a real git object store.
//!
//! Built with `git2` directly so tests do not depend on a `git` binary. The
//! repository path doubles as a clone URL.

use std::fs;
use std::path::Path;

use git2::{Repository, Signature};
use tempfile::TempDir;

/// A temporary git repository acting as a remote source.
pub struct SourceRepo {
    temp_dir: TempDir,
    repo: Repository,
}

impl Default for SourceRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRepo {
    /// Initialise an empty repository.
    ///
    /// # Panics
    /// Panics if the temporary directory or repository cannot be created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap_or_else(|e| panic!("SourceRepo: tempdir failed: {e}"));
        let repo = Repository::init(temp_dir.path())
            .unwrap_or_else(|e| panic!("SourceRepo: git init failed: {e}"));
        Self { temp_dir, repo }
    }

    /// Initialise a repository with one commit containing `files`.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let source = Self::new();
        source.write(files);
        source.commit("Initial commit");
        source
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Clone URL for this repository.
    pub fn url(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    /// Write files into the working tree without committing.
    pub fn write(&self, files: &[(&str, &str)]) {
        for (relative, content) in files {
            let path = self.path().join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap_or_else(|e| panic!("SourceRepo: mkdir failed: {e}"));
            }
            fs::write(&path, content).unwrap_or_else(|e| panic!("SourceRepo: write {relative} failed: {e}"));
        }
    }

    /// Stage everything and commit on the current branch.
    pub fn commit(&self, message: &str) {
        let mut index = self.repo.index().expect("SourceRepo: index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("SourceRepo: add_all");
        index.write().expect("SourceRepo: index write");
        let tree_id = index.write_tree().expect("SourceRepo: write_tree");
        let tree = self.repo.find_tree(tree_id).expect("SourceRepo: find_tree");
        let signature = Signature::now("Test User", "test@test.com").expect("SourceRepo: signature");

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .expect("SourceRepo: commit");
    }

    /// Create a lightweight tag at HEAD.
    pub fn tag(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel(git2::ObjectType::Commit))
            .expect("SourceRepo: HEAD commit");
        self.repo
            .tag_lightweight(name, &head, false)
            .expect("SourceRepo: tag");
    }
}
