//! Advisory size limits.
//!
//! Exceeding a limit never blocks an install; it only yields a warning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;

pub const DEFAULT_MAX_TEMPLATES: usize = 100;
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 5 * 1024 * 1024;

/// Soft limits applied to a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    pub max_templates: usize,
    pub max_total_bytes: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            max_templates: DEFAULT_MAX_TEMPLATES,
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
        }
    }
}

/// A soft limit that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeWarning {
    TooManyTemplates { count: usize, limit: usize },
    TotalSizeExceeded { bytes: u64, limit: u64 },
}

impl fmt::Display for SizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyTemplates { count, limit } => {
                write!(f, "manifest defines {count} templates (soft limit {limit})")
            }
            Self::TotalSizeExceeded { bytes, limit } => {
                write!(f, "template files total {bytes} bytes (soft limit {limit})")
            }
        }
    }
}

impl SizeLimits {
    /// Check a manifest against these limits.
    ///
    /// Files that cannot be stat'ed are ignored here; validation reports them.
    pub fn check(&self, manifest: &Manifest) -> Vec<SizeWarning> {
        let mut warnings = Vec::new();

        let count = manifest.templates.len();
        if count > self.max_templates {
            warnings.push(SizeWarning::TooManyTemplates {
                count,
                limit: self.max_templates,
            });
        }

        let bytes: u64 = manifest
            .templates
            .iter()
            .flat_map(|t| &t.files)
            .filter_map(|file| std::fs::metadata(manifest.file_path(file)).ok())
            .map(|meta| meta.len())
            .sum();
        if bytes > self.max_total_bytes {
            warnings.push(SizeWarning::TotalSizeExceeded {
                bytes,
                limit: self.max_total_bytes,
            });
        }

        for warning in &warnings {
            tracing::warn!(manifest = %manifest.name, "{warning}");
        }
        warnings
    }
}

impl Manifest {
    /// Size advisories under the default limits.
    pub fn size_warnings(&self) -> Vec<SizeWarning> {
        SizeLimits::default().check(self)
    }
}
