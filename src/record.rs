//! Consolidation record
//!
//! The flat `source<TAB>target` file a copy run produces and a prune run
//! consumes. Entries are appended one line at a time as each copy
//! completes, so an interrupted run never leaves a line for work that did
//! not happen. The pruner acts on nothing but these entries.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::RECORD_FIELD_SEPARATOR;
use crate::error::{NestError, Result};

/// One consolidated directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Whether `path` survives a write and re-read of the record file
///
/// Fields are tab-separated and entries newline-terminated, and paths are
/// written as UTF-8, so any of those breaks the entry.
pub fn is_recordable(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|s| !s.contains(RECORD_FIELD_SEPARATOR) && !s.contains(['\n', '\r']))
}

/// Append-only list of consolidated directories
#[derive(Debug)]
pub struct ConsolidationRecord {
    path: Option<PathBuf>,
    file: Option<File>,
    entries: Vec<RecordEntry>,
}

impl ConsolidationRecord {
    /// A record that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            path: None,
            file: None,
            entries: Vec::new(),
        }
    }

    /// Starts a fresh record file at `path`, replacing any previous one
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| NestError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| NestError::io(path, e))?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            file: Some(file),
            entries: Vec::new(),
        })
    }

    /// Reads an existing record for pruning
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(NestError::MissingRecord {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| NestError::io(path, e))?;
        let entries = parse_entries(path, &content)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            file: None,
            entries,
        })
    }

    /// Appends an entry, writing it through to the file when there is one
    pub fn append(&mut self, entry: RecordEntry) -> Result<()> {
        for path in [&entry.source, &entry.target] {
            if !is_recordable(path) {
                return Err(NestError::action(
                    "record",
                    path.as_path(),
                    "path contains a tab, a line break or non-UTF-8 bytes",
                ));
            }
        }
        if let (Some(file), Some(path)) = (self.file.as_mut(), self.path.as_ref()) {
            writeln!(
                file,
                "{}{RECORD_FIELD_SEPARATOR}{}",
                entry.source.display(),
                entry.target.display()
            )
            .and_then(|_| file.flush())
            .map_err(|e| NestError::io(path, e))?;
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entries(path: &Path, content: &str) -> Result<Vec<RecordEntry>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let (source, target) =
                line.split_once(RECORD_FIELD_SEPARATOR)
                    .ok_or_else(|| NestError::MalformedRecord {
                        path: path.to_path_buf(),
                        line: index + 1,
                        message: "expected source and target separated by a tab".to_string(),
                    })?;
            if source.is_empty() || target.is_empty() {
                return Err(NestError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: index + 1,
                    message: "empty path".to_string(),
                });
            }
            Ok(RecordEntry {
                source: PathBuf::from(source),
                target: PathBuf::from(target),
            })
        })
        .collect()
}
