//! Filesystem operations abstraction layer
//!
//! Every mutation the engine performs goes through the [`FileSystem`]
//! trait. [`RealFileSystem`] applies it; [`DryRunFileSystem`] keeps the
//! read side live but replaces each write with a log line, which is how
//! preview mode runs the full decision logic without touching the tree.

use log::info;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::{NestError, Result};

/// Trait for filesystem operations
pub trait FileSystem {
    /// Create a directory and all its parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a file or a symlink
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Remove a directory and all its contents
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Write a string to a file, creating the file if it doesn't exist
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Copy a file from source to destination
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Rename/move a file or directory
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Create a symlink at `link` whose content is `target`
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;

    /// Read the entire contents of a file into a string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Immediate children of a directory, sorted by file name
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Check if a path exists (follows symlinks)
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a file (follows symlinks)
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory (follows symlinks)
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path itself is a symlink
    fn is_symlink(&self, path: &Path) -> bool;

    /// Whether mutations are only simulated
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Production implementation using std::fs
#[derive(Debug, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    /// Create a new RealFileSystem instance
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| NestError::io(path, e))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|e| NestError::io(path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path).map_err(|e| NestError::io(path, e))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        std::fs::write(path, contents).map_err(|e| NestError::io(path, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        std::fs::copy(from, to).map_err(|e| NestError::io(from, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::rename(from, to).map_err(|e| NestError::io(from, e))
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        let created = std::os::unix::fs::symlink(target, link);
        #[cfg(windows)]
        let created = std::os::windows::fs::symlink_dir(target, link);
        created.map_err(|e| NestError::io(link, e))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| NestError::io(path, e))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)
            .map_err(|e| NestError::io(path, e))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| NestError::io(path, e))?;
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }
}

/// Preview implementation: reads hit the real filesystem, writes are logged
#[derive(Debug, Default)]
pub struct DryRunFileSystem {
    inner: RealFileSystem,
    planned: RefCell<Vec<String>>,
}

impl DryRunFileSystem {
    /// Create a new DryRunFileSystem instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutations that would have been performed, in order
    pub fn planned(&self) -> Vec<String> {
        self.planned.borrow().clone()
    }

    fn plan(&self, action: String) {
        info!("[dry-run] would {action}");
        self.planned.borrow_mut().push(action);
    }
}

impl FileSystem for DryRunFileSystem {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.plan(format!("create directory {}", path.display()));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.plan(format!("remove {}", path.display()));
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.plan(format!("remove directory {}", path.display()));
        Ok(())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.plan(format!(
            "write {} ({} bytes)",
            path.display(),
            contents.len()
        ));
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        self.plan(format!("copy {} -> {}", from.display(), to.display()));
        Ok(0)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.plan(format!("move {} -> {}", from.display(), to.display()));
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.plan(format!("link {} -> {}", link.display(), target.display()));
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.inner.list_dir(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.inner.is_symlink(path)
    }

    fn is_simulated(&self) -> bool {
        true
    }
}
