//! Manifest schema and loading.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use kit_fs::NormalizedPath;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::validation::{self, ValidationIssue};
use crate::{MANIFEST_FILENAME, MANIFEST_FILENAME_ALT};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Complete manifest loaded from `instructionkit.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Source name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Source version. Numeric YAML values (`1.0`) are accepted.
    #[serde(deserialize_with = "string_or_number")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub templates: Vec<TemplateDefinition>,
    #[serde(default)]
    pub bundles: Vec<BundleDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp_servers: Vec<McpServerDefinition>,
    /// Directory the manifest was loaded from; template file paths are
    /// relative to it.
    #[serde(skip)]
    base_dir: PathBuf,
}

/// A named set of files installed together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Unique within the manifest.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub files: Vec<TemplateFile>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Names of other templates in this manifest. Declarative only: checked
    /// for consistency, never used to force an install order.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub kind: ComponentType,
}

/// One file of a template, optionally restricted to a single tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTemplateFile")]
pub struct TemplateFile {
    pub path: NormalizedPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ide: Option<String>,
}

/// Manifests may list files as bare strings or as `{path, ide}` maps.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTemplateFile {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        ide: Option<String>,
    },
}

impl From<RawTemplateFile> for TemplateFile {
    fn from(raw: RawTemplateFile) -> Self {
        match raw {
            RawTemplateFile::Path(path) => Self {
                path: NormalizedPath::new(path),
                ide: None,
            },
            RawTemplateFile::Detailed { path, ide } => Self {
                path: NormalizedPath::new(path),
                ide,
            },
        }
    }
}

impl TemplateFile {
    /// Whether this file should be installed for the tool with `slug`.
    pub fn applies_to(&self, slug: &str) -> bool {
        self.ide
            .as_deref()
            .is_none_or(|ide| ide.eq_ignore_ascii_case(slug))
    }
}

/// A named group of templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub templates: Vec<String>,
}

/// An MCP server a source can install into a tool's MCP configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Values may reference `${VAR}` placeholders resolved from the merged
    /// environment at install time.
    #[serde(default)]
    pub env: std::collections::BTreeMap<String, String>,
}

impl McpServerDefinition {
    /// Variables referenced through `${VAR}` placeholders in args and env.
    pub fn required_vars(&self) -> BTreeSet<String> {
        self.args
            .iter()
            .chain(self.env.values())
            .flat_map(|value| PLACEHOLDER.captures_iter(value))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}

/// Replace `${VAR}` placeholders using `lookup`; unknown variables stay as-is.
pub fn substitute_placeholders<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(value, |caps: &regex::Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Kind of artifact a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    #[default]
    Instruction,
    #[serde(alias = "mcp")]
    McpServer,
    Hook,
    Command,
    Resource,
}

impl ComponentType {
    pub const ALL: [ComponentType; 5] = [
        Self::Instruction,
        Self::McpServer,
        Self::Hook,
        Self::Command,
        Self::Resource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instruction => "instruction",
            Self::McpServer => "mcp_server",
            Self::Hook => "hook",
            Self::Command => "command",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "instruction" => Ok(Self::Instruction),
            "mcp_server" | "mcp" => Ok(Self::McpServer),
            "hook" => Ok(Self::Hook),
            "command" => Ok(Self::Command),
            "resource" => Ok(Self::Resource),
            other => Err(format!("unknown component type '{other}'")),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Int(i) => i.to_string(),
        StringOrNumber::Float(f) if f.fract() == 0.0 => format!("{f:.1}"),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

impl Manifest {
    /// Locate the manifest file inside a source directory.
    pub fn find_in(dir: &Path) -> Option<PathBuf> {
        [MANIFEST_FILENAME, MANIFEST_FILENAME_ALT]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Parse manifest YAML without validating it.
    ///
    /// `base_dir` is the directory file paths are resolved against.
    pub fn from_yaml(content: &str, base_dir: &Path) -> std::result::Result<Self, serde_yaml::Error> {
        let mut manifest: Manifest = serde_yaml::from_str(content)?;
        manifest.base_dir = base_dir.to_path_buf();
        Ok(manifest)
    }

    /// Read, parse and fully validate a manifest file.
    ///
    /// Every validation problem is collected and reported together in
    /// [`Error::Invalid`]; nothing is reported piecemeal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let manifest = Self::from_yaml(&content, &base_dir).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let issues = manifest.validate();
        if !issues.is_empty() {
            return Err(Error::Invalid {
                path: path.to_path_buf(),
                issues,
            });
        }

        tracing::debug!(
            manifest = %manifest.name,
            templates = manifest.templates.len(),
            bundles = manifest.bundles.len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    /// Load the manifest found in a source directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = Self::find_in(dir).ok_or_else(|| Error::NotFound(dir.to_path_buf()))?;
        Self::load(&path)
    }

    /// Run every structural, file and dependency check.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        validation::validate(self)
    }

    /// Directory template file paths are relative to.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute location of a template file.
    pub fn file_path(&self, file: &TemplateFile) -> PathBuf {
        file.path.resolve_against(&self.base_dir)
    }

    pub fn template(&self, name: &str) -> Option<&TemplateDefinition> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn bundle(&self, name: &str) -> Option<&BundleDefinition> {
        self.bundles.iter().find(|b| b.name == name)
    }

    pub fn mcp_server(&self, name: &str) -> Option<&McpServerDefinition> {
        self.mcp_servers.iter().find(|s| s.name == name)
    }

    /// Templates named by a bundle, in bundle order.
    pub fn bundle_templates(&self, bundle: &str) -> Result<Vec<&TemplateDefinition>> {
        let definition = self.bundle(bundle).ok_or_else(|| Error::UnknownName {
            manifest: self.name.clone(),
            kind: "bundle",
            name: bundle.to_string(),
        })?;

        definition
            .templates
            .iter()
            .map(|name| {
                self.template(name).ok_or_else(|| Error::UnknownName {
                    manifest: self.name.clone(),
                    kind: "template",
                    name: name.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: demo
description: Demo source
version: 1.0
templates:
  - name: base
    files: [rules/base.md]
"#;

    #[test]
    fn numeric_version_is_accepted() {
        let manifest = Manifest::from_yaml(MINIMAL, Path::new("/src")).unwrap();
        assert_eq!(manifest.version, "1.0");
    }

    #[test]
    fn files_accept_both_forms() {
        let yaml = r#"
name: demo
description: d
version: "1.0.0"
templates:
  - name: mixed
    files:
      - plain.md
      - path: cursor.md
        ide: cursor
"#;
        let manifest = Manifest::from_yaml(yaml, Path::new("/src")).unwrap();
        let files = &manifest.templates[0].files;
        assert_eq!(files[0].path.as_str(), "plain.md");
        assert_eq!(files[0].ide, None);
        assert_eq!(files[1].ide.as_deref(), Some("cursor"));
        assert!(files[0].applies_to("claude"));
        assert!(files[1].applies_to("Cursor"));
        assert!(!files[1].applies_to("claude"));
    }

    #[test]
    fn missing_required_field_fails() {
        let err = Manifest::from_yaml("name: demo\nversion: '1'\n", Path::new("/")).unwrap_err();
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn template_kind_defaults_to_instruction() {
        let manifest = Manifest::from_yaml(MINIMAL, Path::new("/src")).unwrap();
        assert_eq!(manifest.templates[0].kind, ComponentType::Instruction);
    }

    #[test]
    fn mcp_required_vars_come_from_placeholders() {
        let server = McpServerDefinition {
            name: "issues".into(),
            description: None,
            command: "npx".into(),
            args: vec!["--url=${ISSUES_URL}".into()],
            env: [
                ("TOKEN".to_string(), "${ISSUES_TOKEN}".to_string()),
                ("MODE".to_string(), "fixed".to_string()),
            ]
            .into_iter()
            .collect(),
        };
        let vars: Vec<String> = server.required_vars().into_iter().collect();
        assert_eq!(vars, vec!["ISSUES_TOKEN", "ISSUES_URL"]);
    }

    #[test]
    fn substitute_keeps_unknown_placeholders() {
        let out = substitute_placeholders("${A}-${B}", |name| (name == "A").then(|| "1".to_string()));
        assert_eq!(out, "1-${B}");
    }

    #[test]
    fn file_path_resolves_against_base_dir() {
        let manifest = Manifest::from_yaml(MINIMAL, Path::new("/src/demo")).unwrap();
        let file = &manifest.templates[0].files[0];
        assert_eq!(manifest.file_path(file), PathBuf::from("/src/demo/rules/base.md"));
    }
}
