//! Recycle area
//!
//! Originals removed by a recycling prune are moved under
//! `<merge_root>/.recycle/<timestamp>/` keeping their path relative to the
//! hierarchy root. Each batch keeps an index of what it holds, which is what
//! makes a batch restorable.

use chrono::{DateTime, Local};
use log::{info, warn};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::{
    RECORD_FIELD_SEPARATOR, RECYCLE_DIR, RECYCLE_INDEX_FILE_NAME, RECYCLE_TIMESTAMP_FORMAT,
};
use crate::error::{NestError, Result};
use crate::filesystem::FileSystem;

/// One original moved into the recycle area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecycleEntry {
    pub original_path: PathBuf,
    pub recycle_path: PathBuf,
    pub created_at: DateTime<Local>,
}

/// Timestamp label for a new batch
pub fn batch_stamp(now: DateTime<Local>) -> String {
    now.format(RECYCLE_TIMESTAMP_FORMAT).to_string()
}

/// `<merge_root>/.recycle`
pub fn recycle_root(merge_root: &Path) -> PathBuf {
    merge_root.join(RECYCLE_DIR)
}

/// One timestamped directory inside the recycle area
#[derive(Debug, Clone)]
pub struct RecycleBatch {
    dir: PathBuf,
    root: PathBuf,
}

impl RecycleBatch {
    /// Batch `stamp` under `merge_root`, holding paths relative to `root`
    pub fn new(merge_root: &Path, stamp: &str, root: &Path) -> Self {
        Self {
            dir: recycle_root(merge_root).join(stamp),
            root: root.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(RECYCLE_INDEX_FILE_NAME)
    }

    /// Where `original` is kept inside this batch
    pub fn recycle_path_for(&self, original: &Path) -> PathBuf {
        match original.strip_prefix(&self.root) {
            Ok(relative) if !relative.as_os_str().is_empty() => self.dir.join(relative),
            _ => self
                .dir
                .join(original.file_name().unwrap_or(original.as_os_str())),
        }
    }

    /// Moves `original` into the batch and indexes it
    pub fn recycle(&self, original: &Path, fs: &dyn FileSystem) -> Result<RecycleEntry> {
        let recycle_path = self.recycle_path_for(original);
        if let Some(parent) = recycle_path.parent() {
            fs.create_dir_all(parent)
                .map_err(|e| NestError::action("create recycle directory for", original, e))?;
        }
        fs.rename(original, &recycle_path)
            .map_err(|e| NestError::action("move to recycle area", original, e))?;

        let entry = RecycleEntry {
            original_path: original.to_path_buf(),
            recycle_path,
            created_at: Local::now(),
        };
        if !fs.is_simulated() {
            self.append_index(&entry)?;
        }
        Ok(entry)
    }

    fn append_index(&self, entry: &RecycleEntry) -> Result<()> {
        let index = self.index_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&index)
            .map_err(|e| NestError::io(&index, e))?;
        writeln!(
            file,
            "{}{sep}{}{sep}{}",
            entry.original_path.display(),
            entry.recycle_path.display(),
            entry.created_at.to_rfc3339(),
            sep = RECORD_FIELD_SEPARATOR
        )
        .map_err(|e| NestError::io(&index, e))
    }

    /// Entries recorded in this batch's index
    pub fn entries(&self) -> Result<Vec<RecycleEntry>> {
        let index = self.index_path();
        if !index.is_file() {
            return Err(NestError::MissingRecord { path: index });
        }
        let content = std::fs::read_to_string(&index).map_err(|e| NestError::io(&index, e))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| parse_index_line(&index, i + 1, line))
            .collect()
    }
}

fn parse_index_line(index: &Path, line_no: usize, line: &str) -> Result<RecycleEntry> {
    let malformed = |message: &str| NestError::MalformedRecord {
        path: index.to_path_buf(),
        line: line_no,
        message: message.to_string(),
    };

    let mut fields = line.split(RECORD_FIELD_SEPARATOR);
    let (Some(original), Some(recycled), Some(created)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed("expected three tab-separated fields"));
    };

    let created_at = DateTime::parse_from_rfc3339(created)
        .map_err(|e| malformed(&format!("bad timestamp: {e}")))?
        .with_timezone(&Local);

    Ok(RecycleEntry {
        original_path: PathBuf::from(original),
        recycle_path: PathBuf::from(recycled),
        created_at,
    })
}

/// Counts from one restore run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub processed: usize,
    pub restored: usize,
    pub skipped: usize,
}

/// Puts every original of a batch back where it was
///
/// The symlink left at the original path by the prune is removed first. An
/// original path occupied by anything other than a symlink is left alone.
pub fn restore_batch(batch: &RecycleBatch, fs: &dyn FileSystem) -> Result<RestoreReport> {
    let mut report = RestoreReport::default();

    for entry in batch.entries()? {
        report.processed += 1;
        match restore_entry(&entry, fs) {
            Ok(()) => {
                info!(
                    "Restored {} from {}",
                    entry.original_path.display(),
                    entry.recycle_path.display()
                );
                report.restored += 1;
            }
            Err(e) => {
                warn!("{e}");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

fn restore_entry(entry: &RecycleEntry, fs: &dyn FileSystem) -> Result<()> {
    let original = &entry.original_path;

    if !fs.exists(&entry.recycle_path) && !fs.is_simulated() {
        return Err(NestError::TargetNotFound {
            target: entry.recycle_path.clone(),
        });
    }

    if fs.is_symlink(original) {
        fs.remove_file(original)
            .map_err(|e| NestError::action("remove link", original, e))?;
    } else if fs.exists(original) {
        return Err(NestError::action(
            "restore",
            original,
            "path is occupied by something other than a consolidation link",
        ));
    }

    if let Some(parent) = original.parent() {
        fs.create_dir_all(parent)
            .map_err(|e| NestError::action("create parent of", original, e))?;
    }
    fs.rename(&entry.recycle_path, original)
        .map_err(|e| NestError::action("restore", original, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_batch_stamp_format() {
        let at = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(batch_stamp(at), "20260304-050607");
    }

    #[test]
    fn test_recycle_path_keeps_root_relative_layout() {
        let batch = RecycleBatch::new(Path::new("/w/merge"), "20260101-000000", Path::new("/w"));
        assert_eq!(
            batch.recycle_path_for(Path::new("/w/a/b/tmp")),
            PathBuf::from("/w/merge/.recycle/20260101-000000/a/b/tmp")
        );
        assert_eq!(
            batch.recycle_path_for(Path::new("/elsewhere/tmp")),
            PathBuf::from("/w/merge/.recycle/20260101-000000/tmp")
        );
    }

    #[test]
    fn test_index_line_round_trip() {
        let line = "/w/a/tmp\t/w/merge/.recycle/s/a/tmp\t2026-01-02T03:04:05+00:00";
        let entry = parse_index_line(Path::new("idx"), 1, line).unwrap();
        assert_eq!(entry.original_path, PathBuf::from("/w/a/tmp"));
        assert!(parse_index_line(Path::new("idx"), 2, "only\ttwo").is_err());
    }
}
