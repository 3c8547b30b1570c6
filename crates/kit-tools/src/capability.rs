//! Tool x component support matrix and per-tool install locations.

use std::path::{Path, PathBuf};

use kit_manifest::ComponentType;

use crate::tool::{Scope, Tool};

/// Base directories install locations are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// The user's home directory.
    pub home: PathBuf,
    /// The detected project root, when there is one.
    pub project: Option<PathBuf>,
}

impl Roots {
    pub fn new(home: impl Into<PathBuf>, project: Option<PathBuf>) -> Self {
        Self {
            home: home.into(),
            project,
        }
    }

    fn base(&self, scope: Scope) -> Option<&Path> {
        match scope {
            Scope::Global => Some(&self.home),
            Scope::Project => self.project.as_deref(),
        }
    }
}

/// What a tool accepts and where its files go.
pub trait ToolCapabilities {
    fn supports(&self, tool: Tool, component: ComponentType) -> bool;

    /// Directory instruction files are written to, or `None` when the tool
    /// has no location for that scope.
    fn instructions_directory(&self, tool: Tool, scope: Scope, roots: &Roots) -> Option<PathBuf>;

    /// Directory a file-based component is written to.
    ///
    /// Commands, hooks and resources live next to the instructions directory
    /// (`.claude/rules` -> `.claude/commands`). MCP servers are not files.
    fn component_directory(
        &self,
        tool: Tool,
        component: ComponentType,
        scope: Scope,
        roots: &Roots,
    ) -> Option<PathBuf> {
        if !self.supports(tool, component) {
            return None;
        }
        let rules = self.instructions_directory(tool, scope, roots)?;
        let sibling = match component {
            ComponentType::Instruction => return Some(rules),
            ComponentType::McpServer => return None,
            ComponentType::Command => "commands",
            ComponentType::Hook => "hooks",
            ComponentType::Resource => "resources",
        };
        Some(rules.parent()?.join(sibling))
    }

    /// Extension appended to installed instruction files.
    fn file_extension(&self, tool: Tool) -> &'static str;

    /// JSON file MCP servers are merged into, with the key holding them.
    fn mcp_config(&self, tool: Tool, scope: Scope, roots: &Roots) -> Option<(PathBuf, &'static str)>;
}

/// Built-in capability table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityTable;

struct ToolRow {
    components: &'static [ComponentType],
    project_dir: &'static str,
    global_dir: Option<&'static str>,
    extension: &'static str,
    mcp_project: Option<&'static str>,
    mcp_global: Option<&'static str>,
    mcp_key: &'static str,
}

const CURSOR: ToolRow = ToolRow {
    components: &[
        ComponentType::Instruction,
        ComponentType::McpServer,
        ComponentType::Command,
    ],
    project_dir: ".cursor/rules",
    global_dir: None,
    extension: ".mdc",
    mcp_project: Some(".cursor/mcp.json"),
    mcp_global: Some(".cursor/mcp.json"),
    mcp_key: "mcpServers",
};

const CLAUDE: ToolRow = ToolRow {
    components: &ComponentType::ALL,
    project_dir: ".claude/rules",
    global_dir: Some(".claude/rules"),
    extension: ".md",
    mcp_project: Some(".mcp.json"),
    mcp_global: Some(".claude.json"),
    mcp_key: "mcpServers",
};

const WINDSURF: ToolRow = ToolRow {
    components: &[ComponentType::Instruction, ComponentType::McpServer],
    project_dir: ".windsurf/rules",
    global_dir: Some(".codeium/windsurf/rules"),
    extension: ".md",
    mcp_project: None,
    mcp_global: Some(".codeium/windsurf/mcp_config.json"),
    mcp_key: "mcpServers",
};

const COPILOT: ToolRow = ToolRow {
    components: &[ComponentType::Instruction, ComponentType::McpServer],
    project_dir: ".github/instructions",
    global_dir: None,
    extension: ".instructions.md",
    mcp_project: Some(".vscode/mcp.json"),
    mcp_global: None,
    mcp_key: "servers",
};

impl CapabilityTable {
    fn row(tool: Tool) -> &'static ToolRow {
        match tool {
            Tool::Cursor => &CURSOR,
            Tool::Claude => &CLAUDE,
            Tool::Windsurf => &WINDSURF,
            Tool::Copilot => &COPILOT,
        }
    }
}

impl ToolCapabilities for CapabilityTable {
    fn supports(&self, tool: Tool, component: ComponentType) -> bool {
        Self::row(tool).components.contains(&component)
    }

    fn instructions_directory(&self, tool: Tool, scope: Scope, roots: &Roots) -> Option<PathBuf> {
        let row = Self::row(tool);
        let relative = match scope {
            Scope::Project => Some(row.project_dir),
            Scope::Global => row.global_dir,
        }?;
        Some(roots.base(scope)?.join(relative))
    }

    fn file_extension(&self, tool: Tool) -> &'static str {
        Self::row(tool).extension
    }

    fn mcp_config(&self, tool: Tool, scope: Scope, roots: &Roots) -> Option<(PathBuf, &'static str)> {
        let row = Self::row(tool);
        let relative = match scope {
            Scope::Project => row.mcp_project,
            Scope::Global => row.mcp_global,
        }?;
        Some((roots.base(scope)?.join(relative), row.mcp_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn roots() -> Roots {
        Roots::new("/home/dev", Some(PathBuf::from("/work/app")))
    }

    #[rstest]
    #[case(Tool::Cursor, ComponentType::Command, true)]
    #[case(Tool::Cursor, ComponentType::Hook, false)]
    #[case(Tool::Claude, ComponentType::Hook, true)]
    #[case(Tool::Claude, ComponentType::Resource, true)]
    #[case(Tool::Windsurf, ComponentType::Command, false)]
    #[case(Tool::Copilot, ComponentType::McpServer, true)]
    #[case(Tool::Copilot, ComponentType::Resource, false)]
    fn support_matrix(#[case] tool: Tool, #[case] component: ComponentType, #[case] expected: bool) {
        assert_eq!(CapabilityTable.supports(tool, component), expected);
    }

    #[test]
    fn every_tool_supports_instructions() {
        for tool in Tool::ALL {
            assert!(CapabilityTable.supports(tool, ComponentType::Instruction));
        }
    }

    #[rstest]
    #[case(Tool::Cursor, Scope::Project, Some("/work/app/.cursor/rules"))]
    #[case(Tool::Cursor, Scope::Global, None)]
    #[case(Tool::Claude, Scope::Global, Some("/home/dev/.claude/rules"))]
    #[case(Tool::Windsurf, Scope::Global, Some("/home/dev/.codeium/windsurf/rules"))]
    #[case(Tool::Copilot, Scope::Project, Some("/work/app/.github/instructions"))]
    #[case(Tool::Copilot, Scope::Global, None)]
    fn instruction_directories(#[case] tool: Tool, #[case] scope: Scope, #[case] expected: Option<&str>) {
        assert_eq!(
            CapabilityTable.instructions_directory(tool, scope, &roots()),
            expected.map(PathBuf::from)
        );
    }

    #[test]
    fn project_scope_without_project_root_has_no_directory() {
        let roots = Roots::new("/home/dev", None);
        assert_eq!(
            CapabilityTable.instructions_directory(Tool::Claude, Scope::Project, &roots),
            None
        );
    }

    #[test]
    fn components_sit_beside_rules() {
        let roots = roots();
        assert_eq!(
            CapabilityTable.component_directory(Tool::Claude, ComponentType::Command, Scope::Project, &roots),
            Some(PathBuf::from("/work/app/.claude/commands"))
        );
        assert_eq!(
            CapabilityTable.component_directory(Tool::Claude, ComponentType::Hook, Scope::Global, &roots),
            Some(PathBuf::from("/home/dev/.claude/hooks"))
        );
        assert_eq!(
            CapabilityTable.component_directory(Tool::Windsurf, ComponentType::Command, Scope::Project, &roots),
            None
        );
        assert_eq!(
            CapabilityTable.component_directory(Tool::Cursor, ComponentType::McpServer, Scope::Project, &roots),
            None
        );
    }

    #[test]
    fn copilot_mcp_uses_servers_key() {
        let (path, key) = CapabilityTable
            .mcp_config(Tool::Copilot, Scope::Project, &roots())
            .unwrap();
        assert_eq!(path, PathBuf::from("/work/app/.vscode/mcp.json"));
        assert_eq!(key, "servers");

        let (_, key) = CapabilityTable
            .mcp_config(Tool::Cursor, Scope::Project, &roots())
            .unwrap();
        assert_eq!(key, "mcpServers");
    }
}
