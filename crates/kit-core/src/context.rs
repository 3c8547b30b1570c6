//! Process-wide paths and settings, resolved once and passed by reference.

use std::path::{Path, PathBuf};

use kit_fs::constants::{INSTALLATIONS_FILE, KIT_DIR};
use kit_tools::{CapabilityTable, Roots, Scope};

use crate::config::{CONFIG_FILE, KitConfig};
use crate::{Error, Result};

/// Environment variable overriding the kit home directory.
pub const HOME_ENV: &str = "INSTRUCTIONKIT_HOME";

/// Everything an operation needs to know about where it runs.
#[derive(Debug, Clone)]
pub struct Context {
    home: PathBuf,
    kit_home: PathBuf,
    cwd: PathBuf,
    project_root: Option<PathBuf>,
    config: KitConfig,
    capabilities: CapabilityTable,
}

impl Context {
    /// Resolve paths for a process started in `cwd`.
    ///
    /// The kit home is `$INSTRUCTIONKIT_HOME` when set, else
    /// `~/.instructionkit`. The project root is the nearest ancestor of
    /// `cwd` carrying a project marker.
    pub fn discover(cwd: &Path) -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
        let kit_home = std::env::var_os(HOME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(KIT_DIR));
        let project_root = kit_fs::find_project_root(cwd);
        Self::new(home, kit_home, cwd.to_path_buf(), project_root)
    }

    /// Build a context from explicit locations, loading `config.toml` from
    /// the kit home.
    pub fn new(
        home: PathBuf,
        kit_home: PathBuf,
        cwd: PathBuf,
        project_root: Option<PathBuf>,
    ) -> Result<Self> {
        let config = KitConfig::load(&kit_home.join(CONFIG_FILE))?;
        tracing::debug!(
            kit_home = %kit_home.display(),
            project_root = ?project_root,
            "Resolved context"
        );
        Ok(Self {
            home,
            kit_home,
            cwd,
            project_root,
            config,
            capabilities: CapabilityTable,
        })
    }

    pub fn with_config(mut self, config: KitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn kit_home(&self) -> &Path {
        &self.kit_home
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// The project root, or an error naming where the search started.
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root()
            .ok_or_else(|| Error::ProjectRootNotFound {
                start: self.cwd.clone(),
            })
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        self.kit_home.join(CONFIG_FILE)
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    pub fn roots(&self) -> Roots {
        Roots::new(&self.home, self.project_root.clone())
    }

    pub fn library_dir(&self) -> PathBuf {
        self.kit_home.join("library")
    }

    /// Base directory of a scope's kit data: the kit home for global scope,
    /// `<project>/.instructionkit` for project scope.
    pub fn scope_dir(&self, scope: Scope) -> Result<PathBuf> {
        match scope {
            Scope::Global => Ok(self.kit_home.clone()),
            Scope::Project => Ok(self.require_project_root()?.join(KIT_DIR)),
        }
    }

    pub fn installations_path(&self, scope: Scope) -> Result<PathBuf> {
        Ok(self.scope_dir(scope)?.join(INSTALLATIONS_FILE))
    }

    /// Dotenv file for a scope: `<kit home>/global/.env` or
    /// `<project>/.instructionkit/.env`.
    pub fn env_path(&self, scope: Scope) -> Result<PathBuf> {
        match scope {
            Scope::Global => Ok(self.kit_home.join("global").join(".env")),
            Scope::Project => Ok(self.scope_dir(scope)?.join(".env")),
        }
    }
}
