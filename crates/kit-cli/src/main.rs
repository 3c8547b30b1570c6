//! InstructionKit CLI
//!
//! Downloads instruction sources into the library and installs them into AI
//! coding tools.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use kit_core::{Context, Installer};
use kit_git::Git2Transport;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, EnvAction};
use error::Result;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("Verbose mode enabled");
    }
}

fn run(command: Commands) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let ctx = Context::discover(&cwd)?;
    let transport = Git2Transport::new();
    let installer = Installer::new(&ctx, &transport);

    match command {
        Commands::Download {
            url,
            reference,
            alias,
            force,
        } => commands::run_download(&installer, &url, reference.as_deref(), alias.as_deref(), force),
        Commands::Library { json } => commands::run_library(&installer, json),
        Commands::Install {
            namespace,
            templates,
            bundle,
            tools,
            scope,
            conflict,
            mcp_servers,
            json,
        } => {
            let mut request = kit_core::InstallRequest::new(namespace, tools, scope).with_templates(templates);
            request.bundle = bundle;
            request.strategy = conflict;
            commands::run_install(&installer, &request, &mcp_servers, json)
        }
        Commands::Installed { scope, json } => commands::run_installed(&installer, scope, json),
        Commands::Uninstall { name, tool, scope } => commands::run_uninstall(&installer, &name, tool, scope),
        Commands::Update { namespace } => commands::run_update(&installer, &namespace),
        Commands::Env { action } => match action {
            EnvAction::Set { key, value, scope } => commands::run_env_set(&installer, scope, &key, &value),
            EnvAction::Unset { key, scope } => commands::run_env_unset(&installer, scope, &key),
            EnvAction::List { scope } => commands::run_env_list(&installer, scope),
            EnvAction::Check { namespace, server } => commands::run_env_check(&installer, &namespace, &server),
        },
        Commands::Validate { manifest } => commands::run_validate(&manifest),
    }
}
