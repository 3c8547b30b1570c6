//! MCP server entries in tool-native JSON configuration files.
//!
//! Servers not installed by InstructionKit are left untouched; only the named
//! entry under the servers key is inserted, replaced or removed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::tool::Tool;

/// Build the JSON entry for one stdio MCP server in `tool`'s format.
pub fn server_entry(
    tool: Tool,
    command: &str,
    args: &[String],
    env: &BTreeMap<String, String>,
) -> Value {
    let mut obj = Map::new();
    if tool == Tool::Copilot {
        obj.insert("type".into(), json!("stdio"));
    }
    obj.insert("command".into(), json!(command));
    if !args.is_empty() {
        obj.insert("args".into(), json!(args));
    }
    if !env.is_empty() {
        obj.insert("env".into(), json!(env));
    }
    Value::Object(obj)
}

/// A tool's MCP configuration file and the key its servers live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpConfigFile {
    path: PathBuf,
    key: &'static str,
}

impl McpConfigFile {
    pub fn new(path: impl Into<PathBuf>, key: &'static str) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace `name`. Returns `false` when the stored entry was
    /// already identical and nothing was written.
    pub fn upsert(&self, name: &str, entry: Value) -> Result<bool> {
        let mut root = self.read()?;
        let servers = self.servers_mut(&mut root)?;
        if servers.get(name) == Some(&entry) {
            tracing::debug!(server = name, path = %self.path.display(), "MCP server unchanged");
            return Ok(false);
        }
        servers.insert(name.to_string(), entry);
        self.write(&root)?;
        tracing::info!(server = name, path = %self.path.display(), "MCP server configured");
        Ok(true)
    }

    /// Remove `name`. Returns whether it was present.
    pub fn remove(&self, name: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let mut root = self.read()?;
        let removed = self.servers_mut(&mut root)?.shift_remove(name).is_some();
        if removed {
            self.write(&root)?;
        }
        Ok(removed)
    }

    /// Server entries currently configured, in name order.
    pub fn list(&self) -> Result<Vec<(String, Value)>> {
        let root = self.read()?;
        let mut servers: Vec<(String, Value)> = root
            .get(self.key)
            .and_then(Value::as_object)
            .map(|servers| servers.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        servers.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(servers)
    }

    fn read(&self) -> Result<Value> {
        let Some(content) = kit_fs::io::read_text_optional(&self.path)? else {
            return Ok(json!({}));
        };
        if content.trim().is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&content).map_err(|e| Error::McpConfig {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn write(&self, root: &Value) -> Result<()> {
        let mut content = serde_json::to_string_pretty(root).map_err(|e| Error::McpConfig {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        content.push('\n');
        kit_fs::io::write_atomic(&self.path, content.as_bytes())?;
        Ok(())
    }

    fn servers_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Map<String, Value>> {
        let invalid = |message: &str| Error::McpConfig {
            path: self.path.clone(),
            message: message.to_string(),
        };
        let obj = root
            .as_object_mut()
            .ok_or_else(|| invalid("top level is not a JSON object"))?;
        obj.entry(self.key)
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .ok_or_else(|| invalid(&format!("'{}' is not a JSON object", self.key)))
    }
}
