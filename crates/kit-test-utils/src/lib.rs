//! Shared test utilities for the InstructionKit workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: real source repositories built with `git2`
//! - [`sandbox`]: isolated home and project directories
//! - [`fixtures`]: sample manifests

pub mod fixtures;
pub mod git;
pub mod sandbox;

pub use git::SourceRepo;
pub use sandbox::Sandbox;
