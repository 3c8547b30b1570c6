//! Ref classification
//!
//! Tags and commits pin a source to fixed content; only branches move and
//! are eligible for updates.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d+\.\d+").expect("tag pattern is valid"));
static COMMIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,40}$").expect("commit pattern is valid"));

/// Kind of Git reference a source is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefType {
    Tag,
    Branch,
    Commit,
}

impl RefType {
    /// Whether the content behind this ref can change upstream.
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Branch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Branch => "branch",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a ref by its shape.
///
/// Version-like names (`v1.2`, `2.0.1-rc1`) are tags, 7 to 40 hex
/// characters are commits, anything else is a branch.
pub fn detect_ref_type(reference: &str) -> RefType {
    let reference = reference.trim();
    if TAG_PATTERN.is_match(reference) {
        RefType::Tag
    } else if COMMIT_PATTERN.is_match(reference) {
        RefType::Commit
    } else {
        RefType::Branch
    }
}

/// Pick the highest semver tag from a list of ref names.
///
/// A leading `v` is tolerated; names that do not parse as semver are
/// ignored. Returns the original name of the winning tag.
pub fn latest_tag<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let version = name.strip_prefix('v').unwrap_or(name);
            semver::Version::parse(version).ok().map(|v| (v, name))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, name)| name)
}
