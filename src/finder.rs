//! Transient directory discovery
//!
//! A single `walkdir` pass over the hierarchy that reports every directory
//! whose name looks like temporary output or a backup copy. Excluded names
//! (build output, dependency caches, VCS metadata) and the merge directory
//! are pruned before their contents are read.

use glob::{MatchOptions, Pattern};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::classifier::ExclusionSet;
use crate::constants::{MAX_DIRECTORY_DEPTH, MSG_SKIPPING_SELF_REFERENCE};
use crate::error::{NestError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A directory selected for consolidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientMatch {
    pub source_path: PathBuf,
    pub pattern: String,
}

/// Compiled set of transient-directory name patterns
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compiles glob patterns, rejecting the first invalid one
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| NestError::Config {
                    message: format!("invalid pattern '{}': {e}", p.as_ref()),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The first pattern matching `name`, case-insensitively
    pub fn matching(&self, name: &str) -> Option<&Pattern> {
        self.patterns
            .iter()
            .find(|p| p.matches_with(name, MATCH_OPTIONS))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Finds transient directories below `root`, sorted by path
///
/// A matched directory is reported as a whole; its own subtree is not
/// searched for further matches. Symlinks are never followed, so a
/// directory already replaced by a link into the merge directory does not
/// match again.
pub fn find_transient_dirs(
    root: &Path,
    patterns: &PatternSet,
    exclusions: &ExclusionSet,
    merge_root: &Path,
) -> Vec<TransientMatch> {
    let mut matches = Vec::new();
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(MAX_DIRECTORY_DEPTH)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read directory entry: {e}");
                continue;
            }
        };

        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if path.starts_with(merge_root) {
            debug!("{MSG_SKIPPING_SELF_REFERENCE}{}", path.display());
            walker.skip_current_dir();
            continue;
        }
        if exclusions.is_excluded(path, root) {
            walker.skip_current_dir();
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if let Some(pattern) = patterns.matching(&name) {
            matches.push(TransientMatch {
                source_path: path.to_path_buf(),
                pattern: pattern.as_str().to_string(),
            });
            walker.skip_current_dir();
        }
    }

    matches.sort_by(|a, b| a.source_path.cmp(&b.source_path));
    matches
}
