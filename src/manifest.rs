//! Submodule manifest synthesis
//!
//! Turns the edges discovered for one parent repository into `.gitmodules`
//! text and keeps the on-disk file in step with it: written when there are
//! edges, left untouched when nothing changed, deleted when the edge list
//! became empty.

use log::warn;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::classifier::sanitize_name;
use crate::constants::{MANIFEST_FILE_NAME, MSG_DUPLICATE_SUBMODULE_NAME};
use crate::error::Result;
use crate::filesystem::FileSystem;
use crate::git::RemoteResolver;

/// A repository root as seen during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryNode {
    pub path: PathBuf,
    pub is_repo: bool,
    pub remote_url: Option<String>,
}

/// One parent → nested repository relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleEdge {
    pub parent_repo_path: PathBuf,
    pub child_repo_path: PathBuf,
    /// Child path relative to the parent, `/`-separated
    pub relative_path: String,
    pub derived_name: String,
    /// Origin URL, or the child path relative to the hierarchy root
    pub resolved_url: String,
}

impl SubmoduleEdge {
    pub fn new(parent: &Path, child: &Path, root: &Path, resolver: &dyn RemoteResolver) -> Self {
        let derived_name = child
            .file_name()
            .map(|name| sanitize_name(&name.to_string_lossy()))
            .unwrap_or_default();

        let resolved_url = resolver
            .origin_url(child)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| slash_path(child, root));

        Self {
            parent_repo_path: parent.to_path_buf(),
            child_repo_path: child.to_path_buf(),
            relative_path: slash_path(child, parent),
            derived_name,
            resolved_url,
        }
    }
}

/// `path` relative to `base`, rendered with forward slashes
fn slash_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// What [`Manifest::sync`] did with the manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestAction {
    /// New or changed content was written
    Written,
    /// The file already held exactly this content
    Unchanged,
    /// The edge list is empty and a stale file was removed
    Deleted,
    /// The edge list is empty and no file existed
    Skipped,
}

impl fmt::Display for ManifestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ManifestAction::Written => "written",
            ManifestAction::Unchanged => "unchanged",
            ManifestAction::Deleted => "deleted",
            ManifestAction::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Submodule manifest owned by one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub owner: PathBuf,
    pub edges: Vec<SubmoduleEdge>,
}

impl Manifest {
    /// Builds the manifest; edge order is kept as discovered
    pub fn build(owner: &Path, edges: Vec<SubmoduleEdge>) -> Self {
        Self {
            owner: owner.to_path_buf(),
            edges,
        }
    }

    /// Location of the manifest file
    pub fn path(&self) -> PathBuf {
        self.owner.join(MANIFEST_FILE_NAME)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Names used by more than one stanza
    ///
    /// Collisions are kept in the output; callers only report them.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for edge in &self.edges {
            let name = edge.derived_name.as_str();
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }

    /// Serialized stanza text
    pub fn render(&self) -> String {
        self.edges
            .iter()
            .map(|edge| {
                format!(
                    "[submodule \"{}\"]\n\tpath = {}\n\turl = {}\n",
                    edge.derived_name, edge.relative_path, edge.resolved_url
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Brings the file on disk in line with the edge list
    pub fn sync(&self, fs: &dyn FileSystem) -> Result<ManifestAction> {
        let path = self.path();

        if self.is_empty() {
            if fs.is_file(&path) {
                fs.remove_file(&path)?;
                return Ok(ManifestAction::Deleted);
            }
            return Ok(ManifestAction::Skipped);
        }

        for name in self.duplicate_names() {
            warn!(
                "{MSG_DUPLICATE_SUBMODULE_NAME} {}: \"{name}\"",
                path.display()
            );
        }

        let content = self.render();
        if fs.is_file(&path) && fs.read_to_string(&path)? == content {
            return Ok(ManifestAction::Unchanged);
        }

        fs.write(&path, &content)?;
        Ok(ManifestAction::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::NoRemoteResolver;

    struct FixedResolver(&'static str);

    impl RemoteResolver for FixedResolver {
        fn origin_url(&self, _repo_path: &Path) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[test]
    fn test_edge_falls_back_to_root_relative_url() {
        let edge = SubmoduleEdge::new(
            Path::new("/h/A"),
            Path::new("/h/A/libs/my lib"),
            Path::new("/h"),
            &NoRemoteResolver,
        );
        assert_eq!(edge.relative_path, "libs/my lib");
        assert_eq!(edge.derived_name, "my_lib");
        assert_eq!(edge.resolved_url, "A/libs/my lib");
    }

    #[test]
    fn test_edge_prefers_origin_url() {
        let edge = SubmoduleEdge::new(
            Path::new("/h/A"),
            Path::new("/h/A/B"),
            Path::new("/h"),
            &FixedResolver("git@example.com:org/B.git"),
        );
        assert_eq!(edge.resolved_url, "git@example.com:org/B.git");
    }

    #[test]
    fn test_render_format() {
        let manifest = Manifest::build(
            Path::new("/h/A"),
            vec![
                SubmoduleEdge::new(
                    Path::new("/h/A"),
                    Path::new("/h/A/B"),
                    Path::new("/h"),
                    &NoRemoteResolver,
                ),
                SubmoduleEdge::new(
                    Path::new("/h/A"),
                    Path::new("/h/A/tools/C"),
                    Path::new("/h"),
                    &NoRemoteResolver,
                ),
            ],
        );

        assert_eq!(
            manifest.render(),
            "[submodule \"B\"]\n\tpath = B\n\turl = A/B\n\n\
             [submodule \"C\"]\n\tpath = tools/C\n\turl = A/tools/C\n"
        );
    }

    #[test]
    fn test_duplicate_names_are_kept_and_reported() {
        let manifest = Manifest::build(
            Path::new("/h/A"),
            vec![
                SubmoduleEdge::new(
                    Path::new("/h/A"),
                    Path::new("/h/A/x/util"),
                    Path::new("/h"),
                    &NoRemoteResolver,
                ),
                SubmoduleEdge::new(
                    Path::new("/h/A"),
                    Path::new("/h/A/y/util"),
                    Path::new("/h"),
                    &NoRemoteResolver,
                ),
            ],
        );

        assert_eq!(manifest.duplicate_names(), vec!["util"]);
        assert_eq!(manifest.render().matches("[submodule \"util\"]").count(), 2);
    }
}
