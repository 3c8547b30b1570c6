//! Manifest schema, parsing and validation for InstructionKit sources.
//!
//! A source repository describes what it distributes in an
//! `instructionkit.yaml` manifest: templates (each a set of files plus
//! declared dependencies on other templates), bundles of templates, and MCP
//! server definitions.
//!
//! # Example YAML
//!
//! ```yaml
//! name: acme-standards
//! description: Coding standards for ACME services
//! version: 1.2.0
//! author: Platform Team
//! templates:
//!   - name: base
//!     description: Shared conventions
//!     files:
//!       - rules/base.md
//!   - name: python
//!     description: Python style
//!     files:
//!       - path: rules/python.md
//!       - path: rules/python.cursor.md
//!         ide: cursor
//!     tags: [python]
//!     dependencies: [base]
//! bundles:
//!   - name: backend
//!     description: Everything a backend service needs
//!     templates: [base, python]
//! mcp_servers:
//!   - name: issues
//!     command: npx
//!     args: ["-y", "@acme/issues-mcp"]
//!     env:
//!       ISSUES_TOKEN: ${ISSUES_TOKEN}
//! ```

pub mod dependency;
pub mod error;
pub mod limits;
pub mod manifest;
pub mod validation;

/// Canonical manifest file name at the root of a source repository.
pub const MANIFEST_FILENAME: &str = "instructionkit.yaml";

/// Alternate manifest file name.
pub const MANIFEST_FILENAME_ALT: &str = "instructionkit.yml";

pub use dependency::DependencyGraph;
pub use error::{Error, Result};
pub use limits::{SizeLimits, SizeWarning};
pub use manifest::{
    BundleDefinition, ComponentType, Manifest, McpServerDefinition, TemplateDefinition,
    TemplateFile, substitute_placeholders,
};
pub use validation::ValidationIssue;
