//! Path classification
//!
//! Answers the two questions every traversal asks: is this directory a
//! repository root, and is this path excluded. One [`ExclusionSet`] is
//! shared by the repository walker, the orchestrator and the transient
//! directory finder, and it is always checked against every path component
//! below the hierarchy root rather than only the final segment.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use crate::constants::{DEFAULT_EXCLUDED_NAMES, GIT_DIR};

/// Returns true if a repository marker exists at `path`
///
/// The marker may be a directory (regular clone) or a file (worktrees and
/// checked-out submodules use a `gitdir:` file). Its contents are not read.
pub fn is_repository_root(path: &Path) -> bool {
    let marker = path.join(GIT_DIR);
    marker.is_dir() || marker.is_file()
}

/// Set of directory names never traversed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::from_names(DEFAULT_EXCLUDED_NAMES.iter().copied())
    }
}

impl ExclusionSet {
    /// Builds a set from exactly the given names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds a name to the set
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether a single directory name is excluded
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether any component of `path` below `root` is excluded
    ///
    /// Components above `root` are ignored so that a hierarchy living under,
    /// say, `/home/me/build/` is not excluded wholesale. A path outside
    /// `root` is checked component by component in full.
    pub fn is_excluded(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative.components().any(|component| match component {
            Component::Normal(name) => name.to_str().is_some_and(|n| self.contains_name(n)),
            _ => false,
        })
    }
}

/// Derives a submodule name from a directory basename
///
/// Spaces become underscores, then everything except ASCII alphanumerics
/// and `.`, `_`, `-` is dropped.
pub fn sanitize_name(basename: &str) -> String {
    basename
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}
