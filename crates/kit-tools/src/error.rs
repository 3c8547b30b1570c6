//! Error types for kit-tools

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] kit_fs::Error),

    #[error("Unknown tool '{0}' (expected one of: cursor, claude, windsurf, copilot)")]
    UnknownTool(String),

    #[error("Unknown scope '{0}' (expected global or project)")]
    UnknownScope(String),

    #[error("Invalid MCP config {path}: {message}")]
    McpConfig { path: PathBuf, message: String },

    #[error("{tool} has no MCP config for {scope} scope")]
    McpScopeNotSupported { tool: String, scope: String },
}
