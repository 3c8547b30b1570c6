//! Source naming and Git transport for InstructionKit
//!
//! - [`namespace`] derives stable library keys from a source URL and ref.
//! - [`reference`] classifies refs as tag, branch or commit.
//! - [`transport`] is the contract the installer uses to obtain sources, with
//!   a `git2`-backed implementation.

pub mod error;
pub mod namespace;
pub mod reference;
pub mod transport;

pub use error::{Error, Result};
pub use namespace::{derive_namespace, sanitize_ref, versioned_namespace};
pub use reference::{RefType, detect_ref_type, latest_tag};
pub use transport::{Git2Transport, GitTransport};
