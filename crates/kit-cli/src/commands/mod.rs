//! Command implementations for kit-cli

pub mod env;
pub mod install;
pub mod library;
pub mod validate;

pub use env::{run_env_check, run_env_list, run_env_set, run_env_unset};
pub use install::{run_install, run_installed, run_uninstall};
pub use library::{run_download, run_library, run_update};
pub use validate::run_validate;
