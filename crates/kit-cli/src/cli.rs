//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kit_core::ConflictStrategy;
use kit_tools::{Scope, Tool};

/// InstructionKit - install AI coding-assistant instructions from Git sources
#[derive(Parser, Debug)]
#[command(name = "kit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Download a source repository into the library
    ///
    /// Examples:
    ///   kit download https://github.com/acme/standards
    ///   kit download https://github.com/acme/standards --ref v1.2.0
    ///   kit download git@github.com:acme/standards.git --as acme
    Download {
        /// Repository URL or local path
        url: String,

        /// Tag, branch or commit to check out
        #[arg(long = "ref", value_name = "REF")]
        reference: Option<String>,

        /// Library namespace to use instead of the repository name
        #[arg(long = "as", value_name = "ALIAS")]
        alias: Option<String>,

        /// Re-download even if the namespace is already in the library
        #[arg(short, long)]
        force: bool,
    },

    /// List downloaded sources
    Library {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Install templates from a downloaded source
    ///
    /// With no template names and no bundle, every template is installed.
    ///
    /// Examples:
    ///   kit install standards --tool claude
    ///   kit install standards python testing --tool cursor --tool claude
    ///   kit install standards --bundle backend --tool claude --scope global
    Install {
        /// Library namespace (see `kit library`)
        namespace: String,

        /// Template names to install
        templates: Vec<String>,

        /// Install a bundle's templates
        #[arg(short, long)]
        bundle: Option<String>,

        /// Target tool (cursor, claude, windsurf, copilot)
        #[arg(short, long = "tool", value_name = "TOOL", required = true)]
        tools: Vec<Tool>,

        #[arg(short, long, default_value = "project")]
        scope: Scope,

        /// What to do when a target file exists (skip, rename, overwrite)
        #[arg(short, long = "conflict", value_name = "STRATEGY")]
        conflict: Option<ConflictStrategy>,

        /// Also merge these MCP servers into each tool's MCP config
        #[arg(long = "mcp", value_name = "SERVER")]
        mcp_servers: Vec<String>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List installed artifacts
    Installed {
        /// Only one scope (default: every available scope)
        #[arg(short, long)]
        scope: Option<Scope>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Remove an installed artifact
    Uninstall {
        /// Artifact name as shown by `kit installed`
        name: String,

        /// Only remove it for this tool
        #[arg(short, long)]
        tool: Option<Tool>,

        #[arg(short, long, default_value = "project")]
        scope: Scope,
    },

    /// Validate a manifest file or source directory
    Validate {
        /// Path to instructionkit.yaml or the directory holding it
        #[arg(default_value = ".")]
        manifest: PathBuf,
    },

    /// Pull new commits for a branch-tracking source
    Update {
        namespace: String,
    },

    /// Manage MCP server credentials
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum EnvAction {
    /// Set a variable
    Set {
        key: String,
        value: String,

        #[arg(short, long, default_value = "project")]
        scope: Scope,
    },

    /// Remove a variable
    Unset {
        key: String,

        #[arg(short, long, default_value = "project")]
        scope: Scope,
    },

    /// List variable names with masked values
    List {
        /// Only one scope (default: merged view)
        #[arg(short, long)]
        scope: Option<Scope>,
    },

    /// Report credentials an MCP server still needs
    Check {
        /// Library namespace
        namespace: String,

        /// MCP server name from the source manifest
        server: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_with_tools_and_conflict() {
        let cli = Cli::parse_from([
            "kit",
            "install",
            "standards",
            "python",
            "--tool",
            "cursor",
            "-t",
            "claude",
            "--conflict",
            "rename",
        ]);
        match cli.command {
            Commands::Install {
                namespace,
                templates,
                tools,
                scope,
                conflict,
                ..
            } => {
                assert_eq!(namespace, "standards");
                assert_eq!(templates, vec!["python"]);
                assert_eq!(tools, vec![Tool::Cursor, Tool::Claude]);
                assert_eq!(scope, Scope::Project);
                assert_eq!(conflict, Some(ConflictStrategy::Rename));
            }
            other => panic!("Expected Install, got {other:?}"),
        }
    }

    #[test]
    fn install_requires_a_tool() {
        assert!(Cli::try_parse_from(["kit", "install", "standards"]).is_err());
    }

    #[test]
    fn unknown_tool_is_rejected() {
        assert!(Cli::try_parse_from(["kit", "install", "standards", "--tool", "emacs"]).is_err());
    }

    #[test]
    fn parse_download_flags() {
        let cli = Cli::parse_from(["kit", "download", "https://x/y.git", "--ref", "v1.0", "--as", "acme", "-f"]);
        assert_eq!(
            cli.command,
            Commands::Download {
                url: "https://x/y.git".into(),
                reference: Some("v1.0".into()),
                alias: Some("acme".into()),
                force: true,
            }
        );
    }

    #[test]
    fn parse_env_set_global() {
        let cli = Cli::parse_from(["kit", "env", "set", "TOKEN", "abc", "--scope", "global"]);
        assert_eq!(
            cli.command,
            Commands::Env {
                action: EnvAction::Set {
                    key: "TOKEN".into(),
                    value: "abc".into(),
                    scope: Scope::Global,
                }
            }
        );
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["kit", "library", "-v"]);
        assert!(cli.verbose);
    }
}
