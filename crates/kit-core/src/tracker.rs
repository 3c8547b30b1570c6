//! Record of what was installed where.
//!
//! One JSON document per scope. Every mutation loads the whole document,
//! changes it in memory and rewrites it atomically. There is no locking
//! between processes: concurrent writers race and the last one wins.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use kit_fs::{ConfigStore, NormalizedPath};
use kit_manifest::ComponentType;
use kit_tools::{Scope, Tool};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;
use crate::context::Context;

/// Current tracking document schema.
pub const SCHEMA_VERSION: &str = "1.0";

/// One installed artifact.
///
/// Identity is `(instruction_name, ai_tool, scope)`: a store never holds two
/// records with the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(alias = "template_name")]
    pub instruction_name: String,
    /// Source URL the artifact came from.
    pub source_repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Absolute in memory. Project stores persist it relative to the
    /// project root.
    pub installed_path: PathBuf,
    #[serde(default)]
    pub scope: Scope,
    pub installed_at: DateTime<Utc>,
    pub checksum: String,
    #[serde(alias = "ide_type")]
    pub ai_tool: Tool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_name: Option<String>,
    #[serde(default)]
    pub kind: ComponentType,
}

impl InstallationRecord {
    pub fn new(
        instruction_name: impl Into<String>,
        ai_tool: Tool,
        scope: Scope,
        installed_path: impl Into<PathBuf>,
        checksum: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instruction_name: instruction_name.into(),
            source_repo: String::new(),
            source_version: None,
            namespace: None,
            installed_path: installed_path.into(),
            scope,
            installed_at: Utc::now(),
            checksum: checksum.into(),
            ai_tool,
            bundle_name: None,
            kind: ComponentType::Instruction,
        }
    }

    pub fn same_identity(&self, other: &InstallationRecord) -> bool {
        self.matches(&other.instruction_name, Some(other.ai_tool), other.scope)
    }

    fn matches(&self, name: &str, tool: Option<Tool>, scope: Scope) -> bool {
        self.instruction_name == name
            && tool.is_none_or(|tool| self.ai_tool == tool)
            && self.scope == scope
    }
}

/// On-disk tracking document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingDocument {
    #[serde(default)]
    pub installations: Vec<InstallationRecord>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(default = "schema_version")]
    pub schema_version: String,
}

fn schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Default for TrackingDocument {
    fn default() -> Self {
        Self {
            installations: Vec::new(),
            last_updated: Utc::now(),
            schema_version: schema_version(),
        }
    }
}

/// Scope-partitioned installation store.
#[derive(Debug, Clone)]
pub struct InstallationTracker {
    global_path: PathBuf,
    project: Option<ProjectStore>,
    cwd: PathBuf,
}

#[derive(Debug, Clone)]
struct ProjectStore {
    root: PathBuf,
    path: PathBuf,
}

impl InstallationTracker {
    pub fn new(ctx: &Context) -> Self {
        let project = ctx.project_root().map(|root| ProjectStore {
            root: root.to_path_buf(),
            path: root.join(kit_fs::KIT_DIR).join(kit_fs::constants::INSTALLATIONS_FILE),
        });
        Self {
            global_path: ctx.kit_home().join(kit_fs::constants::INSTALLATIONS_FILE),
            project,
            cwd: ctx.cwd().to_path_buf(),
        }
    }

    /// Location of the store for `scope`.
    pub fn store_path(&self, scope: Scope) -> Result<&Path> {
        match scope {
            Scope::Global => Ok(&self.global_path),
            Scope::Project => Ok(&self.project_store()?.path),
        }
    }

    fn project_store(&self) -> Result<&ProjectStore> {
        self.project
            .as_ref()
            .ok_or_else(|| crate::Error::ProjectRootNotFound {
                start: self.cwd.clone(),
            })
    }

    /// Load a scope's document with paths made absolute.
    pub fn load(&self, scope: Scope) -> Result<TrackingDocument> {
        let path = self.store_path(scope)?;
        let mut document: TrackingDocument = ConfigStore::new()
            .load_optional(path)?
            .unwrap_or_default();

        if scope == Scope::Project {
            let root = &self.project_store()?.root;
            for record in &mut document.installations {
                record.installed_path = NormalizedPath::new(&record.installed_path).resolve_against(root);
            }
        }
        Ok(document)
    }

    fn save(&self, scope: Scope, mut document: TrackingDocument) -> Result<()> {
        let path = self.store_path(scope)?.to_path_buf();

        if scope == Scope::Project {
            let root = &self.project_store()?.root;
            for record in &mut document.installations {
                if let Some(relative) = NormalizedPath::relative_to(&record.installed_path, root) {
                    record.installed_path = PathBuf::from(relative.as_str());
                }
            }
        }

        document.last_updated = Utc::now();
        document.schema_version = schema_version();
        ConfigStore::new().save(&path, &document)?;
        tracing::debug!(
            path = %path.display(),
            records = document.installations.len(),
            "Saved installation records"
        );
        Ok(())
    }

    /// Upsert by identity: any record with the same name, tool and scope is
    /// replaced by `record`.
    pub fn add(&self, record: InstallationRecord) -> Result<()> {
        let scope = record.scope;
        let mut document = self.load(scope)?;
        let before = document.installations.len();
        document.installations.retain(|r| !r.same_identity(&record));
        if document.installations.len() != before {
            tracing::debug!(name = %record.instruction_name, tool = %record.ai_tool, %scope, "Replacing existing record");
        }
        document.installations.push(record);
        self.save(scope, document)
    }

    /// Records in `scope`, or in every available scope when `None`.
    ///
    /// With `None`, the project scope is silently left out when there is no
    /// project.
    pub fn list(&self, scope: Option<Scope>) -> Result<Vec<InstallationRecord>> {
        match scope {
            Some(scope) => Ok(self.load(scope)?.installations),
            None => {
                let mut records = self.load(Scope::Global)?.installations;
                if self.project.is_some() {
                    records.extend(self.load(Scope::Project)?.installations);
                }
                Ok(records)
            }
        }
    }

    pub fn find(&self, name: &str, tool: Tool, scope: Scope) -> Result<Option<InstallationRecord>> {
        Ok(self
            .load(scope)?
            .installations
            .into_iter()
            .find(|r| r.matches(name, Some(tool), scope)))
    }

    /// Remove records for `name` (for one tool or all tools) and return them.
    ///
    /// Installed files are left on disk.
    pub fn remove_by_identity(
        &self,
        name: &str,
        tool: Option<Tool>,
        scope: Scope,
    ) -> Result<Vec<InstallationRecord>> {
        self.remove_where(scope, |r| r.matches(name, tool, scope))
    }

    /// Remove every record installed from `namespace` and return them.
    pub fn remove_by_namespace(&self, namespace: &str, scope: Scope) -> Result<Vec<InstallationRecord>> {
        self.remove_where(scope, |r| r.namespace.as_deref() == Some(namespace))
    }

    pub fn records_for_bundle(&self, bundle: &str, scope: Scope) -> Result<Vec<InstallationRecord>> {
        Ok(self
            .load(scope)?
            .installations
            .into_iter()
            .filter(|r| r.bundle_name.as_deref() == Some(bundle))
            .collect())
    }

    fn remove_where<F>(&self, scope: Scope, predicate: F) -> Result<Vec<InstallationRecord>>
    where
        F: Fn(&InstallationRecord) -> bool,
    {
        let mut document = self.load(scope)?;
        let (removed, kept): (Vec<_>, Vec<_>) = document.installations.into_iter().partition(|r| predicate(r));
        if removed.is_empty() {
            return Ok(removed);
        }
        document.installations = kept;
        self.save(scope, document)?;
        Ok(removed)
    }
}
