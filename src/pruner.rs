//! Reversible pruner
//!
//! Replaces each recorded source with a relative symlink to its
//! consolidated copy, after either recycling or deleting the original. The
//! only input is a [`ConsolidationRecord`]; the pruner never decides on its
//! own what to remove. A failing entry is counted as skipped and the loop
//! moves on.

use log::{info, warn};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::constants::{MSG_ALREADY_CONSOLIDATED, MSG_SKIPPING_SELF_REFERENCE};
use crate::error::{NestError, Result};
use crate::filesystem::FileSystem;
use crate::record::{ConsolidationRecord, RecordEntry};
use crate::recycle::RecycleBatch;

/// What happens to an original before it is replaced by a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruneMode {
    /// Move into the timestamped recycle area
    #[default]
    Recycle,
    /// Remove permanently
    Delete,
}

impl fmt::Display for PruneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneMode::Recycle => f.write_str("recycle"),
            PruneMode::Delete => f.write_str("delete"),
        }
    }
}

/// Settings for one prune run
#[derive(Debug, Clone)]
pub struct PruneOptions {
    pub root: PathBuf,
    pub merge_root: PathBuf,
    pub mode: PruneMode,
    /// Recycle batch label, see [`crate::recycle::batch_stamp`]
    pub stamp: String,
}

/// Counts from one prune run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub processed: usize,
    pub pruned: usize,
    pub skipped: usize,
}

impl fmt::Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={}, pruned={}, skipped={}",
            self.processed, self.pruned, self.skipped
        )
    }
}

/// Prunes every entry of `record`
pub fn prune(
    record: &ConsolidationRecord,
    options: &PruneOptions,
    fs: &dyn FileSystem,
) -> PruneReport {
    let batch = RecycleBatch::new(&options.merge_root, &options.stamp, &options.root);
    let mut report = PruneReport::default();

    for entry in record.entries() {
        report.processed += 1;
        match prune_entry(entry, options, &batch, fs) {
            Ok(true) => report.pruned += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                warn!("{e}");
                report.skipped += 1;
            }
        }
    }

    report
}

/// Prunes one entry; `Ok(false)` means it was skipped without error
fn prune_entry(
    entry: &RecordEntry,
    options: &PruneOptions,
    batch: &RecycleBatch,
    fs: &dyn FileSystem,
) -> Result<bool> {
    let RecordEntry { source, target } = entry;

    if source.starts_with(&options.merge_root) {
        warn!("{MSG_SKIPPING_SELF_REFERENCE}{}", source.display());
        return Ok(false);
    }

    if fs.is_symlink(source) {
        info!("{MSG_ALREADY_CONSOLIDATED}{}", source.display());
        return Ok(false);
    }

    if !fs.exists(source) {
        warn!("Source no longer exists, skipping: {}", source.display());
        return Ok(false);
    }

    if !fs.exists(target) {
        if !fs.is_simulated() {
            return Err(NestError::TargetNotFound {
                target: target.clone(),
            });
        }
        info!(
            "[dry-run] target {} not present yet, assuming it was copied",
            target.display()
        );
    }

    match options.mode {
        PruneMode::Delete => {
            let removed = if fs.is_dir(source) {
                fs.remove_dir_all(source)
            } else {
                fs.remove_file(source)
            };
            removed.map_err(|e| NestError::action("delete", source, e))?;
        }
        PruneMode::Recycle => {
            batch.recycle(source, fs)?;
        }
    }

    let link_parent = source.parent().unwrap_or(Path::new(""));
    let link_target = relative_path(link_parent, target);
    fs.symlink(&link_target, source)
        .map_err(|e| NestError::action("symlink", source, e))?;

    info!(
        "Pruned {} ({}) -> {}",
        source.display(),
        options.mode,
        link_target.display()
    );
    Ok(true)
}

/// Path from directory `from` to `to`, both absolute
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/w/proj", "/w/merge/proj", "../merge/proj" ; "sibling tree")]
    #[test_case("/w/a/b/c", "/w/merge/c", "../../../merge/c" ; "deeper source")]
    #[test_case("/w", "/w/merge/w", "merge/w" ; "source at root")]
    #[test_case("/w/x", "/w/x", "." ; "same directory")]
    fn test_relative_path(from: &str, to: &str, expected: &str) {
        assert_eq!(
            relative_path(Path::new(from), Path::new(to)),
            PathBuf::from(expected)
        );
    }

    #[test]
    fn test_report_display() {
        let report = PruneReport {
            processed: 5,
            pruned: 4,
            skipped: 1,
        };
        assert_eq!(report.to_string(), "processed=5, pruned=4, skipped=1");
    }
}
