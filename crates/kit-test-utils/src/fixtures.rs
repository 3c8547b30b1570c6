//! Sample sources used across test suites.

/// A source with two instruction templates, a command, a bundle and one MCP
/// server that needs a credential.
pub const STANDARDS_MANIFEST: &str = r#"name: standards
description: Shared coding standards
version: 1.2.0
author: Platform Team
templates:
  - name: python
    description: Python conventions
    tags: [python, style]
    files:
      - rules/python.md
      - path: rules/python.cursor.md
        ide: cursor
  - name: testing
    description: Testing guidelines
    files: [rules/testing.md]
    dependencies: [python]
  - name: review
    description: Review checklist command
    kind: command
    files: [commands/review.md]
bundles:
  - name: backend
    description: Backend defaults
    templates: [python, testing]
mcp_servers:
  - name: github
    description: GitHub API
    command: npx
    args: ["-y", "@modelcontextprotocol/server-github", "--token", "${GITHUB_TOKEN}"]
    env:
      GITHUB_TOKEN: "${GITHUB_TOKEN}"
"#;

pub const PYTHON_RULES: &str = "# Python\n\nUse type hints everywhere.\n";
pub const PYTHON_CURSOR_RULES: &str = "# Python (Cursor)\n\nPrefer ruff.\n";
pub const TESTING_RULES: &str = "# Testing\n\nWrite tests first.\n";
pub const REVIEW_COMMAND: &str = "Review the staged diff for correctness.\n";

/// Every file of the standards source, manifest included.
pub fn standards_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("instructionkit.yaml", STANDARDS_MANIFEST),
        ("rules/python.md", PYTHON_RULES),
        ("rules/python.cursor.md", PYTHON_CURSOR_RULES),
        ("rules/testing.md", TESTING_RULES),
        ("commands/review.md", REVIEW_COMMAND),
    ]
}
