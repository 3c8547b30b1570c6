//! Filesystem primitives for InstructionKit
//!
//! Provides checksum calculation and verification, crash-safe single-file
//! writes, forward-slash normalized paths for portable records, project root
//! detection and a format-agnostic config store.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod project;

pub use checksum::Algorithm;
pub use config::ConfigStore;
pub use constants::{KIT_DIR, ProjectMarker};
pub use error::{Error, Result};
pub use io::{WriteOptions, WriteOutcome};
pub use path::NormalizedPath;
pub use project::find_project_root;
