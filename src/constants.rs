//! Constants used throughout the application
//!
//! This module centralizes hardcoded values so that marker names, default
//! pattern sets, file layouts and user-facing messages have a single source
//! of truth.
//!
//! # Organization
//!
//! - **Repository Markers**: names identifying repository roots and manifests
//! - **Exclusions**: directory names never traversed
//! - **Consolidation**: merge directory, record and recycle layout
//! - **Limits**: recursion guards
//! - **Messages**: user-facing message templates
//! - **Icons**: status icons
//!
//! # Usage
//!
//! ```rust
//! use git_nest::constants::{GIT_DIR, MANIFEST_FILE_NAME};
//!
//! let manifest = std::path::Path::new("repo").join(MANIFEST_FILE_NAME);
//! assert!(manifest.ends_with(".gitmodules"));
//! assert_eq!(GIT_DIR, ".git");
//! ```

use colored::*;

// Repository markers
pub const GIT_DIR: &str = ".git";
pub const MANIFEST_FILE_NAME: &str = ".gitmodules";
pub const GIT_ORIGIN: &str = "origin";

// Configuration
pub const CONFIG_FILE_NAME: &str = ".git-nest.toml";

// Exclusions shared by every traversal. Build-output names are included so
// generated artifacts are never mistaken for transient directories.
pub const DEFAULT_EXCLUDED_NAMES: &[&str] = &[
    GIT_DIR,
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "build",
    "dist",
    "out",
    ".venv",
    "venv",
    "__pycache__",
    ".tox",
    ".gradle",
    ".idea",
    ".vscode",
];

// Transient directory families (temporary and backup)
pub const DEFAULT_TRANSIENT_PATTERNS: &[&str] = &[
    "tmp",
    "temp",
    ".tmp",
    "tmp_*",
    "temp_*",
    "*.tmp",
    "backup",
    "backups",
    "bak",
    "*.bak",
    "*_backup",
    "*-backup",
    "*.backup",
    "*~",
];

// Consolidation layout
pub const DEFAULT_MERGE_DIR: &str = "_consolidated";
pub const RECORD_FILE_NAME: &str = ".consolidation-record";
pub const RECYCLE_DIR: &str = ".recycle";
pub const RECYCLE_INDEX_FILE_NAME: &str = ".recycle-index";
pub const RECYCLE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
pub const SCRATCH_DIR_PREFIX: &str = "git-nest-dry-run-";
pub const RECORD_FIELD_SEPARATOR: char = '\t';

// Directory depth limits
pub const MAX_DIRECTORY_DEPTH: usize = 64;

// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

// Log environment
pub const LOG_ENV_VAR: &str = "RUST_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const PREVIEW_LOG_LEVEL: &str = "info";
pub const VERBOSE_LOG_LEVEL: &str = "debug";

// Messages
pub const MSG_NO_TRANSIENT_DIRS: &str = "No transient directories found.";
pub const MSG_DRY_RUN_BANNER: &str = "Dry run: no changes will be made.";
pub const MSG_SKIPPING_SELF_REFERENCE: &str = "Skipping path inside merge directory: ";
pub const MSG_SKIPPING_SYMLINK: &str = "Skipping symlink: ";
pub const MSG_SKIPPING_CIRCULAR_REF: &str = "Skipping circular reference: ";
pub const MSG_ALREADY_CONSOLIDATED: &str = "Already consolidated, skipping: ";
pub const MSG_DUPLICATE_SUBMODULE_NAME: &str = "Duplicate submodule name in manifest";

// Icons
pub const ICON_SUCCESS: &str = "✓";
pub const ICON_ERROR: &str = "✗";
pub const ICON_WARNING: &str = "⚠";
pub const ICON_INFO: &str = "ℹ";
pub const ICON_ARROW: &str = "▸";

// UI Formatting
pub const SEPARATOR_WIDTH: usize = 40;

/// Creates a section header with title and separator
pub fn section_header(title: &str) -> String {
    let title_formatted = title.bright_cyan().bold();
    let separator = "=".repeat(SEPARATOR_WIDTH).bright_blue();
    format!("{title_formatted}\n{separator}")
}
