//! Supported tools and installation scopes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An AI coding tool that can receive installed artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Cursor,
    Claude,
    Windsurf,
    Copilot,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Self::Cursor, Self::Claude, Self::Windsurf, Self::Copilot];

    /// Stable identifier used in records and on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Claude => "claude",
            Self::Windsurf => "windsurf",
            Self::Copilot => "copilot",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cursor => "Cursor",
            Self::Claude => "Claude Code",
            Self::Windsurf => "Windsurf",
            Self::Copilot => "GitHub Copilot",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cursor" => Ok(Self::Cursor),
            "claude" | "claude-code" => Ok(Self::Claude),
            "windsurf" => Ok(Self::Windsurf),
            "copilot" | "github-copilot" => Ok(Self::Copilot),
            _ => Err(Error::UnknownTool(s.to_string())),
        }
    }
}

/// Where an artifact is installed.
///
/// Records written without a scope are global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    #[serde(alias = "GLOBAL")]
    Global,
    #[serde(alias = "PROJECT")]
    Project,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "project" => Ok(Self::Project),
            _ => Err(Error::UnknownScope(s.to_string())),
        }
    }
}
