//! Namespace-keyed index of downloaded sources.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use kit_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const INDEX_FILE: &str = "index.json";

/// An installable file indexed at download time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryInstruction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Template the file belongs to.
    #[serde(default)]
    pub template: String,
    /// Path relative to the source directory.
    pub file_path: NormalizedPath,
    #[serde(default)]
    pub tags: Vec<String>,
    pub checksum: String,
}

/// A downloaded source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRepository {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
    pub version: String,
    pub downloaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub instructions: Vec<LibraryInstruction>,
}

/// A `find_instruction` hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionMatch {
    pub namespace: String,
    pub instruction: LibraryInstruction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct LibraryIndex {
    repositories: BTreeMap<String, LibraryRepository>,
}

/// Library rooted at `<kit home>/library`.
#[derive(Debug, Clone)]
pub struct LibraryManager {
    root: PathBuf,
}

impl LibraryManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Where the source for `namespace` is checked out.
    ///
    /// Fails unless `namespace` is one plain path component, so the result
    /// is always a direct child of the library root.
    pub fn source_dir(&self, namespace: &str) -> Result<PathBuf> {
        let mut components = Path::new(namespace).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single || namespace.contains(['/', '\\']) {
            return Err(Error::InvalidNamespace(namespace.to_string()));
        }
        Ok(self.root.join(namespace))
    }

    fn load(&self) -> Result<LibraryIndex> {
        Ok(ConfigStore::new()
            .load_optional(&self.index_path())?
            .unwrap_or_default())
    }

    fn save(&self, index: &LibraryIndex) -> Result<()> {
        ConfigStore::new().save(&self.index_path(), index)?;
        Ok(())
    }

    /// Insert or replace the entry for `repository.namespace`.
    pub fn add(&self, repository: LibraryRepository) -> Result<()> {
        let mut index = self.load()?;
        tracing::debug!(namespace = %repository.namespace, "Indexing library source");
        index
            .repositories
            .insert(repository.namespace.clone(), repository);
        self.save(&index)
    }

    pub fn get(&self, namespace: &str) -> Result<Option<LibraryRepository>> {
        Ok(self.load()?.repositories.remove(namespace))
    }

    /// All entries in namespace order.
    pub fn list(&self) -> Result<Vec<LibraryRepository>> {
        Ok(self.load()?.repositories.into_values().collect())
    }

    pub fn contains(&self, namespace: &str) -> Result<bool> {
        Ok(self.load()?.repositories.contains_key(namespace))
    }

    /// Drop the entry, then delete its source directory.
    pub fn remove(&self, namespace: &str) -> Result<Option<LibraryRepository>> {
        let dir = self.source_dir(namespace)?;
        let mut index = self.load()?;
        let removed = index.repositories.remove(namespace);
        if removed.is_some() {
            self.save(&index)?;
            tracing::info!(namespace, "Removed library source");
        }
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| kit_fs::Error::io(&dir, e))?;
        }
        Ok(removed)
    }

    /// Find instructions by `name` in any namespace, or by
    /// `namespace/name` in one.
    pub fn find_instruction(&self, query: &str) -> Result<Vec<InstructionMatch>> {
        let (namespace, name) = match query.split_once('/') {
            Some((namespace, name)) => (Some(namespace), name),
            None => (None, query),
        };
        let index = self.load()?;
        Ok(index
            .repositories
            .into_values()
            .filter(|repo| namespace.is_none_or(|ns| repo.namespace == ns))
            .flat_map(|repo| {
                let owner = repo.namespace;
                repo.instructions
                    .into_iter()
                    .filter(|inst| inst.name == name)
                    .map(move |instruction| InstructionMatch {
                        namespace: owner.clone(),
                        instruction,
                    })
            })
            .collect())
    }
}
