//! Download, install and uninstall orchestration.
//!
//! Structural problems (unknown namespace, invalid manifest, unknown
//! template) abort the whole call. Anything that goes wrong with a single
//! artifact becomes a `Skipped` or `Failed` report entry and the remaining
//! artifacts still run. Multi-artifact installs are not transactional:
//! re-running the install is the recovery path.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use kit_fs::{WriteOptions, checksum};
use kit_git::{GitTransport, RefType, detect_ref_type, latest_tag, versioned_namespace};
use kit_manifest::{ComponentType, Manifest, TemplateDefinition, TemplateFile};
use kit_tools::{Instruction, McpConfigFile, Roots, Scope, Tool, ToolCapabilities, server_entry, translate};

use crate::conflict::{self, ConflictStrategy};
use crate::context::Context;
use crate::credentials::EnvironmentConfig;
use crate::library::{LibraryInstruction, LibraryManager, LibraryRepository};
use crate::report::{
    ArtifactReport, ArtifactStatus, DownloadOutcome, InstallReport, RemovedArtifact, UpdateOutcome,
};
use crate::tracker::{InstallationRecord, InstallationTracker};
use crate::{Error, Result};

/// What to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub namespace: String,
    /// Template names. Empty together with no bundle means every template.
    pub templates: Vec<String>,
    pub bundle: Option<String>,
    pub tools: Vec<Tool>,
    pub scope: Scope,
    /// Falls back to the configured default when `None`.
    pub strategy: Option<ConflictStrategy>,
}

impl InstallRequest {
    pub fn new(namespace: impl Into<String>, tools: Vec<Tool>, scope: Scope) -> Self {
        Self {
            namespace: namespace.into(),
            templates: Vec::new(),
            bundle: None,
            tools,
            scope,
            strategy: None,
        }
    }

    pub fn with_templates(mut self, templates: Vec<String>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

/// One template file destined for one tool.
struct Artifact<'m> {
    name: String,
    template: &'m TemplateDefinition,
    file: &'m TemplateFile,
}

/// Drives library, manifest, writer and tracker for one context.
pub struct Installer<'a> {
    ctx: &'a Context,
    git: &'a dyn GitTransport,
    library: LibraryManager,
    tracker: InstallationTracker,
    env: EnvironmentConfig,
}

impl<'a> Installer<'a> {
    pub fn new(ctx: &'a Context, git: &'a dyn GitTransport) -> Self {
        Self {
            ctx,
            git,
            library: LibraryManager::new(ctx.library_dir()),
            tracker: InstallationTracker::new(ctx),
            env: EnvironmentConfig::new(ctx),
        }
    }

    pub fn library(&self) -> &LibraryManager {
        &self.library
    }

    pub fn tracker(&self) -> &InstallationTracker {
        &self.tracker
    }

    pub fn environment(&self) -> &EnvironmentConfig {
        &self.env
    }

    // -----------------------------------------------------------------------
    // Library
    // -----------------------------------------------------------------------

    /// Clone a source into the library and index its manifest.
    pub fn download(
        &self,
        url: &str,
        reference: Option<&str>,
        alias: Option<&str>,
        force: bool,
    ) -> Result<DownloadOutcome> {
        let namespace = versioned_namespace(url, reference, alias)?;
        if !force && let Some(existing) = self.library.get(&namespace)? {
            tracing::info!(%namespace, "Source already in library");
            return Ok(DownloadOutcome::AlreadyExists(existing));
        }

        let dest = self.library.source_dir(&namespace)?;
        remove_dir_if_exists(&dest)?;

        let fetched = self
            .fetch(url, reference, &dest)
            .and_then(|()| self.index_source(&namespace, url, reference, alias, &dest));
        let repository = match fetched {
            Ok(repository) => repository,
            Err(e) => {
                if let Err(cleanup) = remove_dir_if_exists(&dest) {
                    tracing::warn!(path = %dest.display(), error = %cleanup, "Failed to clean up partial download");
                }
                return Err(e);
            }
        };

        self.library.add(repository.clone())?;
        tracing::info!(%namespace, instructions = repository.instructions.len(), "Downloaded source");
        Ok(DownloadOutcome::Downloaded(repository))
    }

    fn fetch(&self, url: &str, reference: Option<&str>, dest: &Path) -> Result<()> {
        self.git.clone_repo(url, dest, None)?;
        if let Some(reference) = reference {
            self.git.checkout(dest, reference)?;
        }
        Ok(())
    }

    fn index_source(
        &self,
        namespace: &str,
        url: &str,
        reference: Option<&str>,
        alias: Option<&str>,
        dir: &Path,
    ) -> Result<LibraryRepository> {
        let manifest = Manifest::load_from_dir(dir)?;
        self.ctx.config().limits.check(&manifest);
        let algorithm = self.ctx.config().checksum_algorithm;

        let mut instructions = Vec::new();
        for template in &manifest.templates {
            for file in &template.files {
                instructions.push(LibraryInstruction {
                    name: artifact_name(template, file),
                    description: template.description.clone(),
                    template: template.name.clone(),
                    file_path: file.path.clone(),
                    tags: template.tags.clone(),
                    checksum: checksum::calculate_file(&manifest.file_path(file), algorithm)?,
                });
            }
        }

        Ok(LibraryRepository {
            namespace: namespace.to_string(),
            name: manifest.name.clone(),
            description: manifest.description.clone(),
            url: url.to_string(),
            author: manifest.author.clone(),
            version: manifest.version.clone(),
            downloaded_at: Utc::now(),
            alias: alias.map(str::to_string),
            reference: reference.map(str::to_string),
            instructions,
        })
    }

    /// Pull a branch-tracking source. Tags and commits are reported as
    /// pinned, with a newer remote tag when one exists.
    pub fn update(&self, namespace: &str) -> Result<UpdateOutcome> {
        let repository = self.repository(namespace)?;
        let ref_type = repository
            .reference
            .as_deref()
            .map(detect_ref_type)
            .unwrap_or(RefType::Branch);

        if let (false, Some(reference)) = (ref_type.is_mutable(), repository.reference.clone()) {
            let newer_tag = if ref_type == RefType::Tag {
                let refs = self.git.list_refs(&repository.url)?;
                latest_tag(refs.iter().map(String::as_str))
                    .filter(|&latest| latest != reference && latest_tag([reference.as_str(), latest]) == Some(latest))
                    .map(str::to_string)
            } else {
                None
            };
            tracing::info!(namespace, %reference, %ref_type, "Source is pinned");
            return Ok(UpdateOutcome::Pinned {
                namespace: namespace.to_string(),
                reference,
                ref_type,
                newer_tag,
            });
        }

        let dir = self.library.source_dir(namespace)?;
        if !self.git.pull(&dir)? {
            return Ok(UpdateOutcome::UpToDate {
                namespace: namespace.to_string(),
            });
        }

        let refreshed = self.index_source(
            namespace,
            &repository.url,
            repository.reference.as_deref(),
            repository.alias.as_deref(),
            &dir,
        )?;
        self.library.add(refreshed.clone())?;
        tracing::info!(namespace, "Updated source");
        Ok(UpdateOutcome::Updated(refreshed))
    }

    fn repository(&self, namespace: &str) -> Result<LibraryRepository> {
        self.library
            .get(namespace)?
            .ok_or_else(|| Error::UnknownNamespace(namespace.to_string()))
    }

    // -----------------------------------------------------------------------
    // Install
    // -----------------------------------------------------------------------

    /// Install templates from a downloaded source into each requested tool.
    pub fn install(&self, request: &InstallRequest) -> Result<InstallReport> {
        if request.scope == Scope::Project {
            self.ctx.require_project_root()?;
        }
        let repository = self.repository(&request.namespace)?;
        let manifest = Manifest::load_from_dir(&self.library.source_dir(&repository.namespace)?)?;
        self.ctx.config().limits.check(&manifest);

        let templates = select_templates(&manifest, request)?;
        let strategy = request
            .strategy
            .unwrap_or(self.ctx.config().conflict_strategy);
        let roots = self.ctx.roots();

        let mut report = InstallReport::default();
        for template in templates {
            for &tool in &request.tools {
                let (artifacts, superseded) = artifacts_for(template, tool);
                for artifact in superseded {
                    report.push(ArtifactReport::skipped(
                        &artifact.name,
                        tool,
                        request.scope,
                        format!("superseded by a {tool}-specific file"),
                    ));
                }
                for artifact in artifacts {
                    let entry = self
                        .install_artifact(&repository, &manifest, &artifact, tool, request, strategy, &roots)
                        .unwrap_or_else(|e| {
                            ArtifactReport::failed(&artifact.name, tool, request.scope, e.to_string())
                        });
                    report.push(entry);
                }
            }
        }
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn install_artifact(
        &self,
        repository: &LibraryRepository,
        manifest: &Manifest,
        artifact: &Artifact<'_>,
        tool: Tool,
        request: &InstallRequest,
        strategy: ConflictStrategy,
        roots: &Roots,
    ) -> Result<ArtifactReport> {
        let scope = request.scope;
        let name = artifact.name.as_str();
        let component = artifact.template.kind;
        let capabilities = self.ctx.capabilities();

        if !capabilities.supports(tool, component) {
            return Ok(ArtifactReport::skipped(
                name,
                tool,
                scope,
                format!("{tool} does not support {component}"),
            ));
        }
        if component == ComponentType::McpServer {
            return Ok(ArtifactReport::skipped(
                name,
                tool,
                scope,
                "mcp_server templates are installed from mcp_servers definitions",
            ));
        }
        let Some(dir) = capabilities.component_directory(tool, component, scope, roots) else {
            return Ok(ArtifactReport::skipped(
                name,
                tool,
                scope,
                format!("{tool} has no {scope} location for {component}"),
            ));
        };

        let raw = kit_fs::io::read_text(&manifest.file_path(artifact.file))?;
        let (file_name, content) = if component == ComponentType::Instruction {
            let translated = translate(
                tool,
                &Instruction {
                    name: name.to_string(),
                    description: artifact.template.description.clone(),
                    content: raw,
                },
            );
            (translated.file_name, translated.content)
        } else {
            (format!("{name}{}", dotted_extension(artifact.file)), raw)
        };

        let target = dir.join(file_name);
        let (path, status) = match conflict::plan(name, &target, strategy) {
            None => (target, ArtifactStatus::Installed),
            Some(info) => match (info.resolution, info.new_path) {
                (ConflictStrategy::Rename, Some(path)) => (path, ArtifactStatus::Renamed),
                (ConflictStrategy::Overwrite, Some(path)) => (path, ArtifactStatus::Overwritten),
                _ => {
                    return Ok(ArtifactReport::skipped(
                        name,
                        tool,
                        scope,
                        format!("{} already exists", info.existing_path.display()),
                    ));
                }
            },
        };

        let options = if status == ArtifactStatus::Overwritten && self.ctx.config().backup_on_overwrite {
            WriteOptions::with_backup()
        } else {
            WriteOptions::default()
        };
        let outcome = kit_fs::io::write_with(&path, options, |file| file.write_all(content.as_bytes()))?;

        let algorithm = self.ctx.config().checksum_algorithm;
        let digest = checksum::calculate(content.as_bytes(), algorithm);
        checksum::verify_file(&path, &digest, algorithm)?;

        let mut record = InstallationRecord::new(name, tool, scope, path.clone(), digest);
        record.source_repo = repository.url.clone();
        record.source_version = repository
            .reference
            .clone()
            .or_else(|| Some(repository.version.clone()));
        record.namespace = Some(repository.namespace.clone());
        record.bundle_name = request.bundle.clone();
        record.kind = component;
        self.tracker.add(record)?;

        let mut entry = ArtifactReport::written(name, tool, scope, status, path);
        entry.backup = outcome.backup;
        Ok(entry)
    }

    /// Merge one MCP server from a source manifest into a tool's MCP config.
    ///
    /// Missing credentials skip the server and name the missing variables.
    pub fn install_mcp_server(
        &self,
        namespace: &str,
        server: &str,
        tool: Tool,
        scope: Scope,
    ) -> Result<ArtifactReport> {
        if scope == Scope::Project {
            self.ctx.require_project_root()?;
        }
        let repository = self.repository(namespace)?;
        let manifest = Manifest::load_from_dir(&self.library.source_dir(namespace)?)?;
        let definition = manifest
            .mcp_server(server)
            .ok_or_else(|| kit_manifest::Error::UnknownName {
                manifest: manifest.name.clone(),
                kind: "MCP server",
                name: server.to_string(),
            })?;

        let capabilities = self.ctx.capabilities();
        if !capabilities.supports(tool, ComponentType::McpServer) {
            return Ok(ArtifactReport::skipped(server, tool, scope, format!("{tool} does not support MCP servers")));
        }
        let Some((config_path, key)) = capabilities.mcp_config(tool, scope, &self.ctx.roots()) else {
            return Ok(ArtifactReport::skipped(server, tool, scope, format!("{tool} has no {scope} MCP config")));
        };

        let missing = self.env.validate_for_server(&definition.required_vars())?;
        if !missing.is_empty() {
            return Ok(ArtifactReport::skipped(
                server,
                tool,
                scope,
                format!("missing credentials: {}", missing.join(", ")),
            ));
        }

        let vars = self.env.merge()?;
        let resolve = |value: &str| kit_manifest::substitute_placeholders(value, |name| vars.get(name).cloned());
        let args: Vec<String> = definition.args.iter().map(|arg| resolve(arg)).collect();
        let env: BTreeMap<String, String> = definition
            .env
            .iter()
            .map(|(k, v)| (k.clone(), resolve(v)))
            .collect();
        let entry = server_entry(tool, &definition.command, &args, &env);

        let config = McpConfigFile::new(&config_path, key);
        let changed = config.upsert(server, entry.clone())?;

        let algorithm = self.ctx.config().checksum_algorithm;
        let mut record = InstallationRecord::new(
            server,
            tool,
            scope,
            config_path.clone(),
            checksum::calculate(entry.to_string().as_bytes(), algorithm),
        );
        record.source_repo = repository.url.clone();
        record.source_version = repository.reference.clone().or_else(|| Some(repository.version.clone()));
        record.namespace = Some(repository.namespace.clone());
        record.kind = ComponentType::McpServer;
        self.tracker.add(record)?;

        if !changed {
            let mut entry = ArtifactReport::skipped(server, tool, scope, "already configured");
            entry.path = Some(config_path);
            return Ok(entry);
        }
        Ok(ArtifactReport::written(server, tool, scope, ArtifactStatus::Installed, config_path))
    }

    // -----------------------------------------------------------------------
    // Uninstall
    // -----------------------------------------------------------------------

    /// Delete the installed artifacts for `name` and drop their records.
    ///
    /// Files already gone are not an error. When one artifact cannot be
    /// deleted, the records of those already deleted are dropped before the
    /// error is returned.
    pub fn uninstall(&self, name: &str, tool: Option<Tool>, scope: Scope) -> Result<Vec<RemovedArtifact>> {
        let records: Vec<InstallationRecord> = self
            .tracker
            .list(Some(scope))?
            .into_iter()
            .filter(|r| r.instruction_name == name && tool.is_none_or(|t| r.ai_tool == t))
            .collect();

        let roots = self.ctx.roots();
        let mut removed: Vec<RemovedArtifact> = Vec::with_capacity(records.len());
        for record in records {
            let artifact_removed = match self.remove_artifact(&record, scope, &roots) {
                Ok(artifact_removed) => artifact_removed,
                Err(e) => {
                    for done in &removed {
                        if let Err(untrack) = self.tracker.remove_by_identity(name, Some(done.record.ai_tool), scope) {
                            tracing::warn!(name, tool = %done.record.ai_tool, error = %untrack, "Failed to drop record of removed artifact");
                        }
                    }
                    return Err(e);
                }
            };
            if !artifact_removed {
                tracing::debug!(path = %record.installed_path.display(), "Artifact already gone");
            }
            removed.push(RemovedArtifact {
                record,
                artifact_removed,
            });
        }

        self.tracker.remove_by_identity(name, tool, scope)?;
        Ok(removed)
    }

    /// Delete one installed artifact. Returns whether anything was there.
    fn remove_artifact(&self, record: &InstallationRecord, scope: Scope, roots: &Roots) -> Result<bool> {
        if record.kind == ComponentType::McpServer {
            return match self.ctx.capabilities().mcp_config(record.ai_tool, scope, roots) {
                Some((path, key)) => Ok(McpConfigFile::new(path, key).remove(&record.instruction_name)?),
                None => Ok(false),
            };
        }
        if !record.installed_path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(&record.installed_path).map_err(|e| kit_fs::Error::io(&record.installed_path, e))?;
        Ok(true)
    }
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| kit_fs::Error::io(dir, e))?;
    }
    Ok(())
}

fn select_templates<'m>(manifest: &'m Manifest, request: &InstallRequest) -> Result<Vec<&'m TemplateDefinition>> {
    if request.bundle.is_none() && request.templates.is_empty() {
        return Ok(manifest.templates.iter().collect());
    }

    let mut selected = match &request.bundle {
        Some(bundle) => manifest.bundle_templates(bundle)?,
        None => Vec::new(),
    };
    for name in &request.templates {
        let template = manifest
            .template(name)
            .ok_or_else(|| kit_manifest::Error::UnknownName {
                manifest: manifest.name.clone(),
                kind: "template",
                name: name.clone(),
            })?;
        if !selected.iter().any(|t| t.name == template.name) {
            selected.push(template);
        }
    }
    Ok(selected)
}

/// The part of a file name before its first `.`.
fn base_stem(file: &TemplateFile) -> &str {
    let name = file.path.file_name().unwrap_or(file.path.as_str());
    name.split('.').next().unwrap_or(name)
}

/// Everything from the first `.` of the file name, e.g. `.md` or `.cursor.md`.
fn dotted_extension(file: &TemplateFile) -> &str {
    let name = file.path.file_name().unwrap_or(file.path.as_str());
    name.find('.').map(|i| &name[i..]).unwrap_or("")
}

/// Artifact name: the template name when all of its files share one stem,
/// otherwise the file's own stem.
fn artifact_name(template: &TemplateDefinition, file: &TemplateFile) -> String {
    let stem = base_stem(file);
    if template.files.iter().all(|f| base_stem(f) == stem) {
        template.name.clone()
    } else {
        stem.to_string()
    }
}

/// Files of `template` that apply to `tool`, with generic files dropped in
/// favour of a tool-specific file of the same artifact name.
fn artifacts_for(template: &TemplateDefinition, tool: Tool) -> (Vec<Artifact<'_>>, Vec<Artifact<'_>>) {
    let applicable: Vec<Artifact<'_>> = template
        .files
        .iter()
        .filter(|file| file.applies_to(tool.slug()))
        .map(|file| Artifact {
            name: artifact_name(template, file),
            template,
            file,
        })
        .collect();

    let specific: Vec<String> = applicable
        .iter()
        .filter(|a| a.file.ide.is_some())
        .map(|a| a.name.clone())
        .collect();

    applicable
        .into_iter()
        .partition(|a| a.file.ide.is_some() || !specific.contains(&a.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kit_fs::NormalizedPath;

    fn template(files: &[(&str, Option<&str>)]) -> TemplateDefinition {
        TemplateDefinition {
            name: "python".into(),
            description: String::new(),
            files: files
                .iter()
                .map(|(path, ide)| TemplateFile {
                    path: NormalizedPath::new(path),
                    ide: ide.map(str::to_string),
                })
                .collect(),
            tags: vec![],
            dependencies: vec![],
            kind: ComponentType::Instruction,
        }
    }

    #[test]
    fn single_stem_templates_use_template_name() {
        let t = template(&[("rules/style.md", None), ("rules/style.cursor.md", Some("cursor"))]);
        assert_eq!(artifact_name(&t, &t.files[0]), "python");
        assert_eq!(artifact_name(&t, &t.files[1]), "python");
    }

    #[test]
    fn multi_file_templates_use_file_stems() {
        let t = template(&[("a.md", None), ("b.md", None)]);
        assert_eq!(artifact_name(&t, &t.files[0]), "a");
        assert_eq!(artifact_name(&t, &t.files[1]), "b");
    }

    #[test]
    fn tool_specific_file_supersedes_generic() {
        let t = template(&[("style.md", None), ("style.cursor.md", Some("cursor"))]);

        let (cursor, superseded) = artifacts_for(&t, Tool::Cursor);
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor[0].file.ide.as_deref(), Some("cursor"));
        assert_eq!(superseded.len(), 1);

        let (claude, superseded) = artifacts_for(&t, Tool::Claude);
        assert_eq!(claude.len(), 1);
        assert_eq!(claude[0].file.ide, None);
        assert!(superseded.is_empty());
    }

    #[test]
    fn dotted_extension_keeps_secondary_suffixes() {
        let t = template(&[("hooks/pre.commit.sh", None), ("Makefile", None)]);
        assert_eq!(dotted_extension(&t.files[0]), ".commit.sh");
        assert_eq!(dotted_extension(&t.files[1]), "");
    }
}
