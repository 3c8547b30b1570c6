//! Layered environment variables for MCP servers.
//!
//! Each scope keeps a dotenv file. Resolution starts from the global file and
//! lets every key present in the project file win.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use kit_tools::Scope;
use regex::Regex;

use crate::context::Context;
use crate::{Error, Result};

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("key pattern is valid"));

/// Ignore rule added to a project's `.gitignore` when its env file is written.
pub const GITIGNORE_ENTRY: &str = ".instructionkit/.env";

pub type EnvMap = BTreeMap<String, String>;

/// Global and project dotenv files for one context.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    global_path: PathBuf,
    project: Option<(PathBuf, PathBuf)>,
    cwd: PathBuf,
}

impl EnvironmentConfig {
    pub fn new(ctx: &Context) -> Self {
        let project = ctx.project_root().and_then(|root| {
            ctx.env_path(Scope::Project)
                .ok()
                .map(|path| (root.to_path_buf(), path))
        });
        Self {
            global_path: ctx.kit_home().join("global").join(".env"),
            project,
            cwd: ctx.cwd().to_path_buf(),
        }
    }

    pub fn path(&self, scope: Scope) -> Result<&Path> {
        match scope {
            Scope::Global => Ok(&self.global_path),
            Scope::Project => self
                .project
                .as_ref()
                .map(|(_, path)| path.as_path())
                .ok_or_else(|| Error::ProjectRootNotFound {
                    start: self.cwd.clone(),
                }),
        }
    }

    /// Variables defined in one scope. A missing file is empty.
    pub fn load(&self, scope: Scope) -> Result<EnvMap> {
        read_env_file(self.path(scope)?)
    }

    /// Global variables overlaid with project variables.
    pub fn merge(&self) -> Result<EnvMap> {
        let mut merged = self.load(Scope::Global)?;
        if self.project.is_some() {
            merged.extend(self.load(Scope::Project)?);
        }
        Ok(merged)
    }

    /// Required variables that are missing after the merge, sorted.
    pub fn validate_for_server(&self, required: &BTreeSet<String>) -> Result<Vec<String>> {
        let merged = self.merge()?;
        Ok(required
            .iter()
            .filter(|name| !merged.contains_key(name.as_str()))
            .cloned()
            .collect())
    }

    /// Substitute `${VAR}` placeholders from the merged variables.
    pub fn resolve_placeholders(&self, value: &str) -> Result<String> {
        let merged = self.merge()?;
        Ok(kit_manifest::substitute_placeholders(value, |name| {
            merged.get(name).cloned()
        }))
    }

    /// Set a variable in one scope, rewriting the file atomically.
    ///
    /// Values are stored one per line, so line breaks and other control
    /// characters (tab excepted) are refused.
    pub fn set(&self, scope: Scope, key: &str, value: &str) -> Result<()> {
        if !KEY_PATTERN.is_match(key) {
            return Err(Error::InvalidEnvKey(key.to_string()));
        }
        if value.chars().any(|c| c.is_control() && c != '\t') {
            return Err(Error::InvalidEnvValue { key: key.to_string() });
        }
        let mut vars = self.load(scope)?;
        vars.insert(key.to_string(), value.to_string());
        self.write(scope, &vars)?;
        tracing::info!(key, %scope, "Set environment variable");
        Ok(())
    }

    /// Remove a variable. Returns whether it was present.
    pub fn unset(&self, scope: Scope, key: &str) -> Result<bool> {
        let mut vars = self.load(scope)?;
        if vars.remove(key).is_none() {
            return Ok(false);
        }
        self.write(scope, &vars)?;
        Ok(true)
    }

    fn write(&self, scope: Scope, vars: &EnvMap) -> Result<()> {
        let path = self.path(scope)?;
        kit_fs::io::write_atomic(path, render_env(vars).as_bytes())?;
        if let (Scope::Project, Some((root, _))) = (scope, &self.project) {
            ensure_gitignored(root)?;
        }
        Ok(())
    }
}

fn read_env_file(path: &Path) -> Result<EnvMap> {
    if !path.exists() {
        return Ok(EnvMap::new());
    }
    let env_error = |message: String| Error::EnvFile {
        path: path.to_path_buf(),
        message,
    };
    let iter = dotenv::from_path_iter(path).map_err(|e| env_error(e.to_string()))?;
    iter.map(|item| item.map_err(|e| env_error(e.to_string())))
        .collect()
}

/// Render variables as `KEY='value'` lines.
///
/// Single quotes keep the value literal, so stored `${VAR}` text is never
/// expanded on read.
fn render_env(vars: &EnvMap) -> String {
    vars.iter()
        .map(|(key, value)| {
            if value.contains('\'') {
                let escaped = value
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"")
                    .replace('$', "\\$");
                format!("{key}=\"{escaped}\"\n")
            } else {
                format!("{key}='{value}'\n")
            }
        })
        .collect()
}

fn ensure_gitignored(project_root: &Path) -> Result<()> {
    let path = project_root.join(".gitignore");
    let existing = kit_fs::io::read_text_optional(&path)?.unwrap_or_default();
    if existing.lines().any(|line| line.trim() == GITIGNORE_ENTRY) {
        return Ok(());
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(GITIGNORE_ENTRY);
    updated.push('\n');
    kit_fs::io::write_atomic(&path, updated.as_bytes())?;
    tracing::debug!(path = %path.display(), "Added env file to .gitignore");
    Ok(())
}
