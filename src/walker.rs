//! Repository tree walking
//!
//! Finds, along every branch below a directory, the first repository root
//! encountered. Ordinary folders are walked through transparently; a
//! discovered repository is never entered, since it owns its own nested
//! repositories.

use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::classifier::{is_repository_root, ExclusionSet};
use crate::constants::{GIT_DIR, MAX_DIRECTORY_DEPTH, MSG_SKIPPING_CIRCULAR_REF, MSG_SKIPPING_SYMLINK};
use crate::error::Result;
use crate::filesystem::FileSystem;
use crate::git::RemoteResolver;
use crate::manifest::SubmoduleEdge;

/// State threaded through one traversal of the hierarchy
pub struct WalkContext<'a> {
    pub root: PathBuf,
    pub exclusions: &'a ExclusionSet,
    pub resolver: &'a dyn RemoteResolver,
    pub fs: &'a dyn FileSystem,
    visited: HashSet<PathBuf>,
}

impl<'a> WalkContext<'a> {
    pub fn new(
        root: &Path,
        exclusions: &'a ExclusionSet,
        resolver: &'a dyn RemoteResolver,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            exclusions,
            resolver,
            fs,
            visited: HashSet::new(),
        }
    }

    /// Records a directory as walked; false if it was already seen
    ///
    /// Identity is the canonical path, so two routes to the same directory
    /// (bind mounts, hard-linked trees) are walked once.
    pub fn mark_visited(&mut self, path: &Path) -> bool {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.visited.insert(canonical)
    }

    /// Subdirectories of `dir` eligible for traversal, sorted by name
    ///
    /// Skips the repository marker, excluded names and symlinks. Unreadable
    /// directories are logged and treated as empty.
    pub fn child_dirs(&self, dir: &Path) -> Vec<PathBuf> {
        let entries = match self.fs.list_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read directory: {e}");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter(|path| {
                if path.file_name().is_some_and(|name| name == GIT_DIR) {
                    return false;
                }
                if self.fs.is_symlink(path) {
                    debug!("{MSG_SKIPPING_SYMLINK}{}", path.display());
                    return false;
                }
                self.fs.is_dir(path) && !self.exclusions.is_excluded(path, &self.root)
            })
            .collect()
    }
}

/// Edges from `parent` to the nearest repository roots at or below `current`
///
/// If `current` is itself a repository root it yields exactly one edge and
/// nothing beneath it is examined.
pub fn find_nested_repos(
    parent: &Path,
    current: &Path,
    ctx: &mut WalkContext<'_>,
) -> Result<Vec<SubmoduleEdge>> {
    let mut roots = Vec::new();
    collect_repository_roots(current, ctx, 0, &mut roots);

    Ok(roots
        .iter()
        .map(|child| SubmoduleEdge::new(parent, child, &ctx.root, ctx.resolver))
        .collect())
}

/// Nearest repository roots at or below `current`, in discovery order
pub fn find_repository_roots(current: &Path, ctx: &mut WalkContext<'_>) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    collect_repository_roots(current, ctx, 0, &mut roots);
    roots
}

fn collect_repository_roots(
    current: &Path,
    ctx: &mut WalkContext<'_>,
    depth: usize,
    roots: &mut Vec<PathBuf>,
) {
    if is_repository_root(current) {
        roots.push(current.to_path_buf());
        return;
    }

    if depth >= MAX_DIRECTORY_DEPTH {
        warn!(
            "Maximum directory depth ({MAX_DIRECTORY_DEPTH}) reached at {}, not descending",
            current.display()
        );
        return;
    }

    if !ctx.mark_visited(current) {
        debug!("{MSG_SKIPPING_CIRCULAR_REF}{}", current.display());
        return;
    }

    for child in ctx.child_dirs(current) {
        collect_repository_roots(&child, ctx, depth + 1, roots);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::RealFileSystem;
    use crate::git::NoRemoteResolver;
    use std::fs;
    use tempfile::TempDir;

    fn make_repo(path: &Path) {
        fs::create_dir_all(path.join(GIT_DIR)).unwrap();
    }

    #[test]
    fn test_stops_at_first_repository_boundary() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        make_repo(&root.join("A"));
        make_repo(&root.join("A/libs/B"));
        make_repo(&root.join("A/libs/B/vendor/C"));

        let exclusions = ExclusionSet::default();
        let fs = RealFileSystem::new();
        let mut ctx = WalkContext::new(root, &exclusions, &NoRemoteResolver, &fs);

        let edges = find_nested_repos(&root.join("A"), &root.join("A/libs"), &mut ctx).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].relative_path, "libs/B");
    }

    #[test]
    fn test_excluded_directories_are_not_walked() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        make_repo(&root.join("node_modules/pkg"));
        make_repo(&root.join("src/pkg"));

        let exclusions = ExclusionSet::default();
        let fs = RealFileSystem::new();
        let mut ctx = WalkContext::new(root, &exclusions, &NoRemoteResolver, &fs);

        let roots = find_repository_roots(root, &mut ctx);
        assert_eq!(roots, vec![root.join("src/pkg")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root, root.join("loop/back")).unwrap();
        make_repo(&root.join("loop/R"));

        let exclusions = ExclusionSet::default();
        let fs = RealFileSystem::new();
        let mut ctx = WalkContext::new(root, &exclusions, &NoRemoteResolver, &fs);

        assert_eq!(find_repository_roots(root, &mut ctx), vec![root.join("loop/R")]);
    }
}
