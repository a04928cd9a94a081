//! Shared fixtures for integration tests

#![allow(dead_code)]

use anyhow::Result;
use git_nest::commands::{resolve_root, ConsolidateMode, ConsolidateOptions};
use git_nest::config::Config;
use git_nest::constants::GIT_DIR;
use git_nest::pruner::PruneMode;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary hierarchy root, canonicalized
pub fn hierarchy() -> Result<(TempDir, PathBuf)> {
    let temp = TempDir::new()?;
    let root = resolve_root(temp.path())?;
    Ok((temp, root))
}

/// Marks `path` as a repository root with a bare `.git` directory
pub fn make_repo(path: &Path) -> Result<()> {
    fs::create_dir_all(path.join(GIT_DIR))?;
    Ok(())
}

/// Creates a real repository at `path` with an origin remote
pub fn make_repo_with_origin(path: &Path, url: &str) -> Result<()> {
    fs::create_dir_all(path)?;
    let repo = git2::Repository::init(path)?;
    repo.remote("origin", url)?;
    Ok(())
}

/// Writes `content` to `path`, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Consolidation options with the default configuration
pub fn options(root: &Path, mode: ConsolidateMode, dry_run: bool) -> Result<ConsolidateOptions> {
    let config = Config::default();
    Ok(ConsolidateOptions {
        root: root.to_path_buf(),
        merge_root: config.merge_root(root),
        mode,
        prune_mode: PruneMode::Recycle,
        dry_run,
        exclusions: config.exclusion_set(),
        patterns: config.pattern_set()?,
    })
}

/// One node of a tree snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File(Vec<u8>),
    Link(PathBuf),
}

/// Every path under `root` with its content, for before/after comparison
pub fn snapshot(root: &Path) -> Result<BTreeMap<PathBuf, Node>> {
    let mut nodes = BTreeMap::new();
    for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(root)?.to_path_buf();
        let node = if entry.path_is_symlink() {
            Node::Link(fs::read_link(entry.path())?)
        } else if entry.file_type().is_dir() {
            Node::Dir
        } else {
            Node::File(fs::read(entry.path())?)
        };
        nodes.insert(relative, node);
    }
    Ok(nodes)
}
