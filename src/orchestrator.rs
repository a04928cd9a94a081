//! Depth-first manifest synthesis across the whole hierarchy
//!
//! Every repository reachable from the root gets its manifest recomputed
//! from scratch on each run. Results are collected in a [`SyncSummary`]
//! passed down the recursion instead of shared counters.

use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::classifier::{is_repository_root, ExclusionSet};
use crate::error::{NestError, Result};
use crate::filesystem::FileSystem;
use crate::git::RemoteResolver;
use crate::manifest::{Manifest, ManifestAction, RepositoryNode};
use crate::walker::{find_nested_repos, find_repository_roots, WalkContext};

/// Outcome for one processed repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOutcome {
    pub node: RepositoryNode,
    pub depth: usize,
    pub submodules: usize,
    pub action: ManifestAction,
}

/// Accumulated result of one orchestration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub repositories: Vec<RepositoryOutcome>,
}

impl SyncSummary {
    fn count(&self, action: ManifestAction) -> usize {
        self.repositories
            .iter()
            .filter(|r| r.action == action)
            .count()
    }

    pub fn written(&self) -> usize {
        self.count(ManifestAction::Written)
    }

    pub fn unchanged(&self) -> usize {
        self.count(ManifestAction::Unchanged)
    }

    pub fn deleted(&self) -> usize {
        self.count(ManifestAction::Deleted)
    }

    pub fn visited(&self) -> usize {
        self.repositories.len()
    }
}

/// Drives walker and synthesizer over a hierarchy
pub struct Orchestrator<'a> {
    ctx: WalkContext<'a>,
    processed: HashSet<PathBuf>,
    summary: SyncSummary,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        root: &Path,
        exclusions: &'a ExclusionSet,
        resolver: &'a dyn RemoteResolver,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self {
            ctx: WalkContext::new(root, exclusions, resolver, fs),
            processed: HashSet::new(),
            summary: SyncSummary::default(),
        }
    }

    /// Processes every repository under the root
    ///
    /// A root that is itself a repository is processed directly; otherwise
    /// the first repository along each branch below it starts a subtree.
    pub fn run(mut self) -> Result<SyncSummary> {
        let root = self.ctx.root.clone();
        if !root.is_dir() {
            return Err(NestError::InvalidRoot { path: root });
        }

        let top_level = if is_repository_root(&root) {
            vec![root.clone()]
        } else {
            find_repository_roots(&root, &mut self.ctx)
        };

        if top_level.is_empty() {
            return Err(NestError::NoRepositoriesFound { root });
        }

        for repo in top_level {
            self.process_repository(&repo, 0)?;
        }

        Ok(self.summary)
    }

    /// Synthesizes the manifest for `repo`, then recurses into nested repositories
    pub fn process_repository(&mut self, repo: &Path, depth: usize) -> Result<()> {
        let canonical = repo.canonicalize().unwrap_or_else(|_| repo.to_path_buf());
        if !self.processed.insert(canonical) {
            debug!("already processed {}", repo.display());
            return Ok(());
        }

        let children = self.ctx.child_dirs(repo);

        let mut edges = Vec::new();
        for child in &children {
            edges.extend(find_nested_repos(repo, child, &mut self.ctx)?);
        }

        let manifest = Manifest::build(repo, edges);
        let action = manifest.sync(self.ctx.fs)?;
        info!(
            "{}{} ({} submodules, manifest {action})",
            "  ".repeat(depth),
            repo.display(),
            manifest.edges.len()
        );

        self.summary.repositories.push(RepositoryOutcome {
            node: RepositoryNode {
                path: repo.to_path_buf(),
                is_repo: true,
                remote_url: self.ctx.resolver.origin_url(repo),
            },
            depth,
            submodules: manifest.edges.len(),
            action,
        });

        for nested in self.nested_repositories(&children, &manifest) {
            self.process_repository(&nested, depth + 1)?;
        }

        Ok(())
    }

    /// Repositories to descend into after `repo`'s manifest is written
    ///
    /// Direct children that are repositories come first, then repositories
    /// one level down inside ordinary folders, then anything deeper the
    /// walker reached through longer chains of ordinary folders.
    fn nested_repositories(&self, children: &[PathBuf], manifest: &Manifest) -> Vec<PathBuf> {
        let mut ordered: Vec<PathBuf> = Vec::new();

        for child in children {
            if is_repository_root(child) {
                ordered.push(child.clone());
            } else {
                ordered.extend(
                    self.ctx
                        .child_dirs(child)
                        .into_iter()
                        .filter(|grandchild| is_repository_root(grandchild)),
                );
            }
        }

        for edge in &manifest.edges {
            if !ordered.contains(&edge.child_repo_path) {
                ordered.push(edge.child_repo_path.clone());
            }
        }

        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GIT_DIR, MANIFEST_FILE_NAME};
    use crate::filesystem::RealFileSystem;
    use crate::git::NoRemoteResolver;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_deep_chain_of_ordinary_folders_still_gets_manifest() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("A").join(GIT_DIR)).unwrap();
        fs::create_dir_all(root.join("A/x/y/z/D").join(GIT_DIR)).unwrap();
        fs::create_dir_all(root.join("A/x/y/z/D/sub/E").join(GIT_DIR)).unwrap();

        let exclusions = ExclusionSet::default();
        let fs_impl = RealFileSystem::new();
        let summary = Orchestrator::new(root, &exclusions, &NoRemoteResolver, &fs_impl)
            .run()
            .unwrap();

        assert_eq!(summary.visited(), 3);
        let d_manifest = fs::read_to_string(root.join("A/x/y/z/D").join(MANIFEST_FILE_NAME)).unwrap();
        assert!(d_manifest.contains("path = sub/E"));
    }

    #[test]
    fn test_missing_root_is_invalid() {
        let exclusions = ExclusionSet::default();
        let fs_impl = RealFileSystem::new();
        let result = Orchestrator::new(
            Path::new("/definitely/not/here"),
            &exclusions,
            &NoRemoteResolver,
            &fs_impl,
        )
        .run();
        assert!(matches!(result, Err(NestError::InvalidRoot { .. })));
    }
}
