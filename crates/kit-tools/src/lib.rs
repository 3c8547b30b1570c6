//! AI tool integrations for InstructionKit.
//!
//! Every supported tool is a variant of [`Tool`]. What a tool accepts and
//! where its files live is answered by one [`CapabilityTable`], and per-tool
//! rendering goes through the single [`translate`] function. MCP server
//! definitions are merged into each tool's JSON configuration by
//! [`McpConfigFile`].

pub mod capability;
pub mod error;
pub mod mcp;
pub mod tool;
pub mod translate;

pub use capability::{CapabilityTable, Roots, ToolCapabilities};
pub use error::{Error, Result};
pub use kit_manifest::ComponentType;
pub use mcp::{McpConfigFile, server_entry};
pub use tool::{Scope, Tool};
pub use translate::{Instruction, TranslatedFile, translate};
