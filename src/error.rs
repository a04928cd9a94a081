//! # Error Handling
//!
//! Centralized error taxonomy for the engine. Library code returns
//! [`Result<T>`]; the binary wraps these in `anyhow` and maps them to exit
//! codes.
//!
//! Only [`NestError::InvalidRoot`], [`NestError::MissingRecord`],
//! [`NestError::MalformedRecord`] and [`NestError::Config`] abort a run.
//! Per-entry failures ([`NestError::TargetNotFound`],
//! [`NestError::MoveOrCopyFailure`]) are reported as warnings and the
//! surrounding loop continues. [`NestError::NoRepositoriesFound`] is benign.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for git-nest operations
#[derive(Error, Debug)]
pub enum NestError {
    /// The hierarchy root does not exist or is not a directory.
    #[error("Invalid root directory: {}", path.display())]
    InvalidRoot { path: PathBuf },

    /// The hierarchy contains no repository roots at all.
    #[error("No repositories found under {}", root.display())]
    NoRepositoriesFound { root: PathBuf },

    /// A prune was requested but no consolidation record exists.
    #[error("Consolidation record not found: {} (run with --copy first)", path.display())]
    MissingRecord { path: PathBuf },

    /// A record line could not be parsed.
    #[error("Malformed record {} at line {line}: {message}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The consolidated copy a prune entry points at is missing.
    #[error("Consolidated target not found: {}", target.display())]
    TargetNotFound { target: PathBuf },

    /// A single copy, move, delete or symlink action failed.
    #[error("Failed to {action} {}: {message}", path.display())]
    MoveOrCopyFailure {
        action: &'static str,
        path: PathBuf,
        message: String,
    },

    /// The configuration file or one of its patterns is invalid.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An I/O error tied to a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NestError {
    /// Wraps an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NestError::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds a per-entry action failure from any displayable error
    pub fn action(action: &'static str, path: impl Into<PathBuf>, err: impl ToString) -> Self {
        NestError::MoveOrCopyFailure {
            action,
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether the run must stop when this error surfaces
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            NestError::NoRepositoriesFound { .. }
                | NestError::TargetNotFound { .. }
                | NestError::MoveOrCopyFailure { .. }
        )
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, NestError>;
