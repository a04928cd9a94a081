//! Remote URL lookup for discovered repositories
//!
//! Discovery itself only looks for the `.git` marker; the origin URL is the
//! one piece of repository metadata the manifest needs. Lookup goes through
//! [`RemoteResolver`] so the synthesizer can be driven without real
//! repositories.

use git2::Repository;
use log::debug;
use std::path::Path;

use crate::constants::GIT_ORIGIN;

/// Resolves the origin URL of a repository root
pub trait RemoteResolver {
    /// The origin URL, or `None` if the repository has no usable origin
    fn origin_url(&self, repo_path: &Path) -> Option<String>;
}

/// Resolver backed by libgit2
#[derive(Debug, Default, Clone, Copy)]
pub struct GitRemoteResolver;

impl RemoteResolver for GitRemoteResolver {
    fn origin_url(&self, repo_path: &Path) -> Option<String> {
        // A marker-only directory is still a repository root for discovery,
        // it just has no remote.
        let repo = match Repository::open(repo_path) {
            Ok(repo) => repo,
            Err(e) => {
                debug!("cannot open {} as repository: {e}", repo_path.display());
                return None;
            }
        };

        let remote = repo.find_remote(GIT_ORIGIN).ok()?;
        remote
            .url()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

/// Resolver that never finds a remote
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRemoteResolver;

impl RemoteResolver for NoRemoteResolver {
    fn origin_url(&self, _repo_path: &Path) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_origin_url_from_real_repository() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let repo = Repository::init(temp.path())?;
        repo.remote(GIT_ORIGIN, "https://example.com/org/lib.git")?;

        let url = GitRemoteResolver.origin_url(temp.path());
        assert_eq!(url.as_deref(), Some("https://example.com/org/lib.git"));
        Ok(())
    }

    #[test]
    fn test_marker_only_directory_has_no_remote() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        std::fs::create_dir(temp.path().join(".git"))?;

        assert_eq!(GitRemoteResolver.origin_url(temp.path()), None);
        Ok(())
    }

    #[test]
    fn test_repository_without_origin() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        Repository::init(temp.path())?;

        assert_eq!(GitRemoteResolver.origin_url(temp.path()), None);
        Ok(())
    }
}
