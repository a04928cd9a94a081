//! git-nest - Nested Repository Manifests and Transient Directory Consolidation
//!
//! git-nest analyses a directory hierarchy holding many independently
//! version-controlled repositories. It does two jobs:
//!
//! - **Submodule manifests**: discovers which repositories are nested inside
//!   which, and writes a `.gitmodules` file into every repository that has
//!   nested ones (and removes it from those that no longer do).
//! - **Consolidation**: finds scattered temporary and backup directories,
//!   copies them into one merge directory, and replaces the originals with
//!   relative symlinks while keeping the originals in a timestamped recycle
//!   area.
//!
//! Every mutation goes through [`filesystem::FileSystem`], so each operation
//! also runs as a side-effect-free preview.
//!
//! # Architecture
//!
//! - [`classifier`] - Repository root detection and path exclusion
//! - [`walker`] - Nearest nested repository discovery
//! - [`manifest`] - Submodule edges and `.gitmodules` synthesis
//! - [`orchestrator`] - Depth-first manifest synthesis over the hierarchy
//! - [`finder`] - Transient directory discovery
//! - [`file_copy`] - Consolidation copier
//! - [`record`] - Consolidation record file
//! - [`pruner`] - Recycle/delete and symlink replacement
//! - [`recycle`] - Recycle area layout and restore
//! - [`commands`] - CLI-facing command implementations
//!
//! # Usage Example
//!
//! ```no_run
//! use git_nest::config::Config;
//! use git_nest::commands::{execute_sync, resolve_root};
//! use std::path::Path;
//!
//! let root = resolve_root(Path::new(".")).expect("invalid root");
//! let config = Config::load_from_root(&root).expect("bad config");
//! let summary = execute_sync(&root, &config, false).expect("sync failed");
//! println!("{} manifests written", summary.written());
//! ```

pub mod classifier;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod file_copy;
pub mod filesystem;
pub mod finder;
pub mod git;
pub mod manifest;
pub mod orchestrator;
pub mod pruner;
pub mod record;
pub mod recycle;
pub mod utils;
pub mod walker;

pub use error::{NestError, Result};
