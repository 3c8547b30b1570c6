//! Namespace derivation for downloaded sources
//!
//! A namespace is the library key of one downloaded source. It is a pure
//! function of the source URL (or an explicit alias) and the optional ref, so
//! downloading the same `(url, ref)` twice always lands on the same key.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{1,50}$").expect("alias pattern is valid"));

/// Separator between the base namespace and the sanitized ref.
pub const VERSION_SEPARATOR: char = '@';

/// Derive the base namespace for a source.
///
/// With an `alias`, the alias itself is the namespace and must match
/// `[A-Za-z0-9-]{1,50}`. Otherwise the last non-empty path segment of the
/// URL is used, for HTTPS, `file://`, local paths and `user@host:path` SSH
/// forms alike, with any trailing `.git` removed. The segment goes through
/// [`sanitize_ref`], so `.`, `..` and other segments with nothing usable are
/// rejected.
pub fn derive_namespace(url: &str, alias: Option<&str>) -> Result<String> {
    if let Some(alias) = alias {
        return if ALIAS_PATTERN.is_match(alias) {
            Ok(alias.to_string())
        } else {
            Err(Error::InvalidNamespace {
                value: alias.to_string(),
                reason: "must be 1-50 characters of letters, digits or '-'".to_string(),
            })
        };
    }

    let without_query = url.trim().split(['?', '#']).next().unwrap_or_default();
    let trimmed = without_query.trim_end_matches(['/', '\\']);
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches(['/', '\\']);

    let segment = trimmed
        .rsplit(['/', '\\', ':'])
        .find(|segment| !segment.is_empty())
        .ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
        })?;

    // `host:` alone (e.g. "git@github.com:") leaves the host as the only segment.
    if segment.contains('@') {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
        });
    }

    let namespace = sanitize_ref(segment);
    if namespace.is_empty() {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
        });
    }
    Ok(namespace)
}

/// Replace characters that are unsafe in directory names.
///
/// Path separators, Windows-reserved characters, whitespace and control
/// characters become `-`; runs of `-` collapse and leading/trailing `-` and
/// `.` are trimmed so the result can never be `.` or `..`.
pub fn sanitize_ref(reference: &str) -> String {
    let mut result = String::with_capacity(reference.len());
    let mut last_was_dash = false;

    for c in reference.chars() {
        let unsafe_char = matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '@')
            || c.is_whitespace()
            || c.is_control();
        if unsafe_char || c == '-' {
            if !last_was_dash {
                result.push('-');
                last_was_dash = true;
            }
        } else {
            result.push(c);
            last_was_dash = false;
        }
    }

    result.trim_matches(|c| c == '-' || c == '.').to_string()
}

/// Build `<namespace>@<sanitized-ref>`, or the bare namespace without a ref.
pub fn versioned_namespace(url: &str, reference: Option<&str>, alias: Option<&str>) -> Result<String> {
    let base = derive_namespace(url, alias)?;
    let Some(reference) = reference else {
        return Ok(base);
    };

    let sanitized = sanitize_ref(reference);
    if sanitized.is_empty() {
        return Err(Error::InvalidNamespace {
            value: reference.to_string(),
            reason: "reference contains no usable characters".to_string(),
        });
    }

    let namespace = format!("{base}{VERSION_SEPARATOR}{sanitized}");
    tracing::debug!(%url, %reference, %namespace, "Resolved versioned namespace");
    Ok(namespace)
}

/// Split a versioned namespace back into `(base, ref)`.
pub fn split_versioned(namespace: &str) -> (&str, Option<&str>) {
    match namespace.split_once(VERSION_SEPARATOR) {
        Some((base, reference)) => (base, Some(reference)),
        None => (namespace, None),
    }
}
