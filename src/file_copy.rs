//! Consolidation copier
//!
//! Copies each transient directory into the merge directory, grouped by the
//! name of the folder that contains it, and appends one record entry per
//! copied directory. Copying is best-effort: a failed entry is reported and
//! skipped, and nothing is recorded for it. A copy is only recorded when
//! every file below the source made it across.
//!
//! # Layout
//!
//! `proj/tmp` and `proj/backup` both land in `<merge_root>/proj`, so all
//! transient output belonging to one project ends up side by side.

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::constants::{
    MAX_DIRECTORY_DEPTH, MSG_SKIPPING_CIRCULAR_REF, MSG_SKIPPING_SELF_REFERENCE,
    MSG_SKIPPING_SYMLINK,
};
use crate::error::{NestError, Result};
use crate::filesystem::FileSystem;
use crate::finder::TransientMatch;
use crate::record::{is_recordable, ConsolidationRecord, RecordEntry};

/// Counts from one copy run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub files: usize,
    pub skipped: usize,
}

/// Where a transient directory is consolidated to
///
/// Returns `None` for a source with no parent folder name (a filesystem root).
pub fn consolidation_target(source: &Path, merge_root: &Path) -> Option<PathBuf> {
    let group = source.parent()?.file_name()?;
    Some(merge_root.join(group))
}

/// Copies every match into the merge directory and records it
///
/// With a simulated filesystem no data moves, but the full decision path
/// runs and every entry is still appended to `record`.
pub fn copy_matches(
    matches: &[TransientMatch],
    merge_root: &Path,
    fs: &dyn FileSystem,
    record: &mut ConsolidationRecord,
) -> Result<CopyReport> {
    let mut report = CopyReport::default();

    for found in matches {
        let source = &found.source_path;

        if source.starts_with(merge_root) {
            warn!("{MSG_SKIPPING_SELF_REFERENCE}{}", source.display());
            report.skipped += 1;
            continue;
        }

        let Some(target) = consolidation_target(source, merge_root) else {
            warn!("No containing folder for {}, skipping", source.display());
            report.skipped += 1;
            continue;
        };

        if !is_recordable(source) || !is_recordable(&target) {
            warn!(
                "Path cannot be stored in the consolidation record, skipping: {}",
                source.display()
            );
            report.skipped += 1;
            continue;
        }

        match copy_directory_recursive(source, &target, 0, fs) {
            Ok(count) => {
                info!(
                    "Consolidated {} -> {} ({count} file{})",
                    source.display(),
                    target.display(),
                    if count == 1 { "" } else { "s" }
                );
                record.append(RecordEntry {
                    source: source.clone(),
                    target,
                })?;
                report.copied += 1;
                report.files += count;
            }
            Err(e) => {
                match e {
                    NestError::MoveOrCopyFailure { .. } => warn!("{e}"),
                    other => warn!("{}", NestError::action("copy", source, &other)),
                }
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Recursively copies a directory's contents into `dest`
///
/// Symlinks inside the source are skipped, as are entries that resolve into
/// the destination itself. A failing entry is logged and the remaining ones
/// are still copied, but the directory as a whole then reports an error.
pub fn copy_directory_recursive(
    source: &Path,
    dest: &Path,
    depth: usize,
    fs: &dyn FileSystem,
) -> Result<usize> {
    if depth >= MAX_DIRECTORY_DEPTH {
        return Err(NestError::action(
            "copy",
            source,
            format!("maximum directory depth ({MAX_DIRECTORY_DEPTH}) exceeded"),
        ));
    }

    fs.create_dir_all(dest)?;

    let canonical_dest = dest.canonicalize().ok();
    let mut total_files = 0;
    let mut failed = 0;

    for source_path in fs.list_dir(source)? {
        let Some(file_name) = source_path.file_name() else {
            continue;
        };
        let dest_path = dest.join(file_name);

        let circular = source_path
            .canonicalize()
            .ok()
            .zip(canonical_dest.as_ref())
            .is_some_and(|(src, dst)| src.starts_with(dst));
        if circular {
            warn!("{MSG_SKIPPING_CIRCULAR_REF}{}", source_path.display());
            continue;
        }

        match copy_entry(&source_path, &dest_path, depth + 1, fs) {
            Ok(count) => total_files += count,
            Err(e) => {
                warn!("Failed to copy {}: {e}", source_path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(NestError::action(
            "copy",
            source,
            format!("{failed} entr{} could not be copied", if failed == 1 { "y" } else { "ies" }),
        ));
    }
    Ok(total_files)
}

fn copy_entry(source: &Path, dest: &Path, depth: usize, fs: &dyn FileSystem) -> Result<usize> {
    if fs.is_symlink(source) {
        log::debug!("{MSG_SKIPPING_SYMLINK}{}", source.display());
        return Ok(0);
    }

    if fs.is_file(source) {
        fs.copy(source, dest)?;
        Ok(1)
    } else if fs.is_dir(source) {
        copy_directory_recursive(source, dest, depth, fs)
    } else {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{DryRunFileSystem, RealFileSystem};
    use std::fs;
    use tempfile::TempDir;

    fn transient(path: PathBuf) -> TransientMatch {
        TransientMatch {
            source_path: path,
            pattern: "tmp".to_string(),
        }
    }

    #[test]
    fn test_target_groups_by_containing_folder() {
        assert_eq!(
            consolidation_target(Path::new("/w/proj/tmp"), Path::new("/w/merge")),
            Some(PathBuf::from("/w/merge/proj"))
        );
        assert_eq!(consolidation_target(Path::new("/"), Path::new("/m")), None);
    }

    #[test]
    fn test_copy_merges_siblings_into_one_group() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("proj/tmp/nested")).unwrap();
        fs::create_dir_all(root.join("proj/backup")).unwrap();
        fs::write(root.join("proj/tmp/a.txt"), "a").unwrap();
        fs::write(root.join("proj/tmp/nested/b.txt"), "b").unwrap();
        fs::write(root.join("proj/backup/c.txt"), "c").unwrap();

        let merge = root.join("merge");
        let mut record = ConsolidationRecord::in_memory();
        let report = copy_matches(
            &[
                transient(root.join("proj/backup")),
                transient(root.join("proj/tmp")),
            ],
            &merge,
            &RealFileSystem::new(),
            &mut record,
        )
        .unwrap();

        assert_eq!(report.copied, 2);
        assert_eq!(report.files, 3);
        assert_eq!(fs::read_to_string(merge.join("proj/nested/b.txt")).unwrap(), "b");
        assert_eq!(fs::read_to_string(merge.join("proj/c.txt")).unwrap(), "c");
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_self_reference_is_never_recorded() {
        let temp = TempDir::new().unwrap();
        let merge = temp.path().join("merge");
        fs::create_dir_all(merge.join("proj/tmp")).unwrap();

        let mut record = ConsolidationRecord::in_memory();
        let report = copy_matches(
            &[transient(merge.join("proj/tmp"))],
            &merge,
            &RealFileSystem::new(),
            &mut record,
        )
        .unwrap();

        assert_eq!(report.skipped, 1);
        assert!(record.is_empty());
    }

    #[test]
    fn test_dry_run_records_but_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("proj/tmp")).unwrap();
        fs::write(root.join("proj/tmp/a.txt"), "a").unwrap();

        let merge = root.join("merge");
        let mut record = ConsolidationRecord::in_memory();
        let dry = DryRunFileSystem::new();
        copy_matches(&[transient(root.join("proj/tmp"))], &merge, &dry, &mut record).unwrap();

        assert!(!merge.exists());
        assert_eq!(record.len(), 1);
        assert!(dry.planned().iter().any(|p| p.starts_with("copy ")));
    }
}
