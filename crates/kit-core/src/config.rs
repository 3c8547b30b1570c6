//! User settings stored in `config.toml` under the kit home.

use std::path::Path;

use kit_fs::{Algorithm, ConfigStore};
use kit_manifest::SizeLimits;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::conflict::ConflictStrategy;

/// File name of the settings document inside the kit home.
pub const CONFIG_FILE: &str = "config.toml";

/// User-level settings.
///
/// Every field has a default, so a missing file or a partial file is valid.
///
/// ```toml
/// conflict_strategy = "rename"
/// backup_on_overwrite = true
/// checksum_algorithm = "sha256"
///
/// [limits]
/// max_templates = 100
/// max_total_bytes = 5242880
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    /// Strategy used when an install target already exists and the caller
    /// did not choose one.
    pub conflict_strategy: ConflictStrategy,
    /// Keep `<file>.bak` when overwriting an existing artifact.
    pub backup_on_overwrite: bool,
    pub checksum_algorithm: Algorithm,
    pub limits: SizeLimits,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            conflict_strategy: ConflictStrategy::default(),
            backup_on_overwrite: true,
            checksum_algorithm: Algorithm::default(),
            limits: SizeLimits::default(),
        }
    }
}

impl KitConfig {
    /// Load settings, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        let config = ConfigStore::new().load_optional(path)?;
        if config.is_none() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
        }
        Ok(config.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }
}
