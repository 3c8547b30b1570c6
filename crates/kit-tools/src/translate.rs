//! Per-tool rendering of instruction files.
//!
//! This is the only place tool-specific file formats are produced.

use crate::capability::{CapabilityTable, ToolCapabilities};
use crate::tool::Tool;

/// Instruction content ready to be rendered for a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Base name of the installed file, without extension.
    pub name: String,
    pub description: String,
    pub content: String,
}

/// A rendered file: its name inside the tool's directory and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedFile {
    pub file_name: String,
    pub content: String,
}

/// Render an instruction for `tool`.
///
/// Cursor and Copilot get YAML front-matter; other tools receive the content
/// unchanged. Content that already starts with front-matter is never wrapped
/// a second time.
pub fn translate(tool: Tool, instruction: &Instruction) -> TranslatedFile {
    let file_name = format!("{}{}", instruction.name, CapabilityTable.file_extension(tool));
    let has_front_matter = instruction.content.starts_with("---\n");

    let content = match tool {
        Tool::Cursor if !has_front_matter => format!(
            "---\ndescription: {}\nglobs:\nalwaysApply: true\n---\n\n{}",
            yaml_scalar(&instruction.description),
            instruction.content
        ),
        Tool::Copilot if !has_front_matter => {
            format!("---\napplyTo: \"**\"\n---\n\n{}", instruction.content)
        }
        _ => instruction.content.clone(),
    };

    TranslatedFile { file_name, content }
}

fn yaml_scalar(value: &str) -> String {
    let line = value.lines().next().unwrap_or_default().trim();
    if line.is_empty() || line.contains(": ") || line.starts_with(['"', '\'', '#', '-', '[', '{']) {
        format!("\"{}\"", line.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        line.to_string()
    }
}
