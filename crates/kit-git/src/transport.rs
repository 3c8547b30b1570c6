//! Git transport contract and `git2` implementation
//!
//! The installer only ever talks to [`GitTransport`]. Retry and timeout
//! policy belong to the implementation; [`Git2Transport`] has neither and
//! reports authentication and network failures as distinct errors.

use std::path::{Path, PathBuf};

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Direction, FetchOptions, Remote, Repository};

use crate::{Error, Result};

/// Operations the installer needs from a Git backend.
pub trait GitTransport {
    /// Clone `url` into `dest`, optionally shallow, returning the local path.
    fn clone_repo(&self, url: &str, dest: &Path, depth: Option<u32>) -> Result<PathBuf>;

    /// Check out a tag, branch or commit in an existing clone.
    fn checkout(&self, local: &Path, reference: &str) -> Result<()>;

    /// Fast-forward the checked-out branch. Returns whether anything changed.
    ///
    /// A detached HEAD (tag or commit checkout) is never updated.
    fn pull(&self, local: &Path) -> Result<bool>;

    /// List branch and tag names advertised by `url`.
    fn list_refs(&self, url: &str) -> Result<Vec<String>>;
}

/// [`GitTransport`] backed by libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Transport;

impl Git2Transport {
    pub fn new() -> Self {
        Self
    }
}

impl GitTransport for Git2Transport {
    fn clone_repo(&self, url: &str, dest: &Path, depth: Option<u32>) -> Result<PathBuf> {
        tracing::info!(%url, dest = %dest.display(), ?depth, "Cloning source");

        let mut fetch = FetchOptions::new();
        if let Some(depth) = depth {
            fetch.depth(i32::try_from(depth).unwrap_or(i32::MAX));
        }

        RepoBuilder::new()
            .fetch_options(fetch)
            .clone(url, dest)
            .map_err(|e| Error::from_remote(url, e))?;

        Ok(dest.to_path_buf())
    }

    fn checkout(&self, local: &Path, reference: &str) -> Result<()> {
        let repo = Repository::open(local)?;
        let candidates = [
            reference.to_string(),
            format!("origin/{reference}"),
            format!("refs/tags/{reference}"),
        ];

        let (object, git_ref) = candidates
            .iter()
            .find_map(|candidate| repo.revparse_ext(candidate).ok())
            .ok_or_else(|| Error::RefNotFound {
                reference: reference.to_string(),
                path: local.to_path_buf(),
            })?;

        repo.checkout_tree(&object, Some(CheckoutBuilder::new().force()))?;

        match git_ref {
            Some(r) if r.is_branch() => {
                if let Some(name) = r.name() {
                    repo.set_head(name)?;
                }
            }
            Some(r) if r.is_remote() => {
                // Remote-only branch: create a local branch tracking it so
                // later pulls can fast-forward.
                let commit = object.peel_to_commit()?;
                let mut branch = repo.branch(reference, &commit, true)?;
                let upstream = format!("origin/{reference}");
                branch.set_upstream(Some(upstream.as_str()))?;
                repo.set_head(&format!("refs/heads/{reference}"))?;
            }
            _ => {
                let commit = object.peel_to_commit()?;
                repo.set_head_detached(commit.id())?;
            }
        }

        tracing::debug!(path = %local.display(), %reference, "Checked out reference");
        Ok(())
    }

    fn pull(&self, local: &Path) -> Result<bool> {
        let repo = Repository::open(local)?;
        let head = repo.head()?;
        if !head.is_branch() {
            tracing::debug!(path = %local.display(), "Detached HEAD is pinned; skipping pull");
            return Ok(false);
        }

        let head_name = head.name().unwrap_or("HEAD").to_string();
        let branch = head.shorthand().unwrap_or("HEAD").to_string();

        let mut remote = repo.find_remote("origin")?;
        let url = remote.url().unwrap_or_default().to_string();
        remote
            .fetch::<&str>(&[], None, None)
            .map_err(|e| Error::from_remote(&url, e))?;

        let upstream = repo.find_reference(&format!("refs/remotes/origin/{branch}"))?;
        let incoming = repo.reference_to_annotated_commit(&upstream)?;
        let (analysis, _) = repo.merge_analysis(&[&incoming])?;

        if analysis.is_up_to_date() {
            return Ok(false);
        }
        if !analysis.is_fast_forward() {
            return Err(Error::NotFastForward {
                path: local.to_path_buf(),
            });
        }

        let mut local_ref = repo.find_reference(&head_name)?;
        local_ref.set_target(incoming.id(), "instructionkit: fast-forward")?;
        repo.set_head(&head_name)?;
        repo.checkout_head(Some(CheckoutBuilder::default().force()))?;

        tracing::info!(path = %local.display(), %branch, "Fast-forwarded source");
        Ok(true)
    }

    fn list_refs(&self, url: &str) -> Result<Vec<String>> {
        let mut remote = Remote::create_detached(url)?;
        remote
            .connect(Direction::Fetch)
            .map_err(|e| Error::from_remote(url, e))?;

        let mut names: Vec<String> = remote
            .list()
            .map_err(|e| Error::from_remote(url, e))?
            .iter()
            .filter_map(|head| {
                let name = head.name();
                if name.ends_with("^{}") {
                    return None;
                }
                name.strip_prefix("refs/heads/")
                    .or_else(|| name.strip_prefix("refs/tags/"))
                    .map(str::to_string)
            })
            .collect();

        names.sort();
        names.dedup();
        Ok(names)
    }
}
