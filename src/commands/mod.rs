//! Command implementations behind the CLI flags
//!
//! Each command has an `execute_*` function holding the logic and returning
//! a report, and a `*_with_output` wrapper that prints it. Tests drive the
//! former; `main` calls the latter.

mod consolidate;
mod submodules;

pub use consolidate::{
    consolidate_with_output, execute_consolidation, execute_restore, execute_scan,
    restore_with_output, scan_with_output, ConsolidateMode, ConsolidateOptions,
    ConsolidationOutcome, ScanEntry,
};
pub use submodules::{execute_sync, sync_with_output};

use std::path::{Path, PathBuf};

use crate::error::{NestError, Result};

/// Canonical form of the hierarchy root
///
/// # Errors
///
/// [`NestError::InvalidRoot`] if the path does not exist or is not a directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(NestError::InvalidRoot {
            path: path.to_path_buf(),
        });
    }
    path.canonicalize().map_err(|_| NestError::InvalidRoot {
        path: path.to_path_buf(),
    })
}
