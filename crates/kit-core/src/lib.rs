//! Installation engine for InstructionKit
//!
//! This crate sits above the filesystem, Git, manifest and tool crates and
//! implements:
//!
//! - **Conflict resolution**: skip, rename or overwrite an existing target
//! - **Installation tracking**: scope-partitioned JSON records, upserted by identity
//! - **Library management**: namespace-keyed index of downloaded sources
//! - **Credential merge**: project-over-global dotenv variables for MCP servers
//! - **Installer**: the download, install, update and uninstall flows
//!
//! # Architecture
//!
//! ```text
//!                      kit-cli
//!                         |
//!                      kit-core
//!                         |
//!     +---------+---------+----------+
//!     |         |         |          |
//!   kit-fs   kit-git  kit-manifest  kit-tools
//! ```
//!
//! Everything runs single-threaded and synchronously. A [`Context`] is built
//! once per process and passed by reference.

pub mod config;
pub mod conflict;
pub mod context;
pub mod credentials;
pub mod error;
pub mod installer;
pub mod library;
pub mod report;
pub mod tracker;

pub use config::KitConfig;
pub use conflict::{ConflictInfo, ConflictStrategy};
pub use context::Context;
pub use credentials::{EnvMap, EnvironmentConfig};
pub use error::{Error, Result};
pub use installer::{InstallRequest, Installer};
pub use library::{InstructionMatch, LibraryInstruction, LibraryManager, LibraryRepository};
pub use report::{
    ArtifactReport, ArtifactStatus, DownloadOutcome, InstallReport, RemovedArtifact, UpdateOutcome,
};
pub use tracker::{InstallationRecord, InstallationTracker, TrackingDocument};
