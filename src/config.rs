//! Configuration management for git-nest
//!
//! Configuration is read from `.git-nest.toml` at the hierarchy root. The
//! file is optional; every setting has a built-in default.
//!
//! # File Format
//!
//! ```toml
//! [exclude]
//! # Added to the built-in exclusion set
//! names = ["third_party", "generated"]
//!
//! [consolidate]
//! merge_dir = "_consolidated"
//! # Replaces the built-in transient pattern set
//! patterns = ["tmp", "*.bak", "scratch*"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classifier::ExclusionSet;
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_MERGE_DIR, DEFAULT_TRANSIENT_PATTERNS};
use crate::error::{NestError, Result};
use crate::finder::PatternSet;

/// Main configuration structure for git-nest
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory names skipped by every traversal
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Transient directory consolidation settings
    #[serde(default)]
    pub consolidate: ConsolidateConfig,
}

/// Extra excluded directory names
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExcludeConfig {
    #[serde(default)]
    pub names: Vec<String>,
}

/// Consolidation settings
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConsolidateConfig {
    /// Name of the merge directory created at the hierarchy root
    pub merge_dir: Option<String>,

    /// Glob patterns (case-insensitive) naming transient directories
    pub patterns: Option<Vec<String>>,
}

impl Config {
    /// Loads `.git-nest.toml` from `root`, or defaults when absent
    ///
    /// # Errors
    ///
    /// Returns [`NestError::Config`] when the file exists but cannot be read
    /// or parsed, or when the merge directory name is not a plain name.
    pub fn load_from_root(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| NestError::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| NestError::Config {
            message: format!("failed to parse {}: {e}", path.display()),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.consolidate.merge_dir {
            validate_merge_dir_name(name)?;
        }
        self.pattern_set().map(|_| ())
    }

    /// Merge directory name, configured or default
    pub fn merge_dir_name(&self) -> &str {
        self.consolidate
            .merge_dir
            .as_deref()
            .unwrap_or(DEFAULT_MERGE_DIR)
    }

    /// Absolute merge directory under `root`
    pub fn merge_root(&self, root: &Path) -> PathBuf {
        root.join(self.merge_dir_name())
    }

    /// Built-in exclusions plus configured names plus the merge directory
    pub fn exclusion_set(&self) -> ExclusionSet {
        let mut set = ExclusionSet::default();
        for name in &self.exclude.names {
            set.insert(name.clone());
        }
        set.insert(self.merge_dir_name());
        set
    }

    /// Compiled transient patterns
    pub fn pattern_set(&self) -> Result<PatternSet> {
        match &self.consolidate.patterns {
            Some(patterns) => PatternSet::new(patterns),
            None => PatternSet::new(DEFAULT_TRANSIENT_PATTERNS),
        }
    }
}

/// Ensures a merge directory name is a single plain path component
pub fn validate_merge_dir_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(NestError::Config {
            message: format!("invalid merge directory name '{name}'"),
        });
    }
    if trimmed.contains(['/', '\\']) {
        return Err(NestError::Config {
            message: format!("merge directory must be a plain name, got '{name}'"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let config = Config::load_from_root(temp.path())?;

        assert_eq!(config, Config::default());
        assert_eq!(config.merge_dir_name(), DEFAULT_MERGE_DIR);
        assert!(config.exclusion_set().contains_name(DEFAULT_MERGE_DIR));
        Ok(())
    }

    #[test]
    fn test_configured_values() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[exclude]\nnames = [\"third_party\"]\n\n[consolidate]\nmerge_dir = \"_stash\"\npatterns = [\"scratch*\"]\n",
        )?;

        let config = Config::load_from_root(temp.path())?;
        assert_eq!(config.merge_root(temp.path()), temp.path().join("_stash"));
        assert!(config.exclusion_set().contains_name("third_party"));
        assert!(config.exclusion_set().contains_name("_stash"));

        let patterns = config.pattern_set()?;
        assert!(patterns.matching("scratchpad").is_some());
        assert!(patterns.matching("tmp").is_none());
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_error() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "[consolidate\n")?;

        let result = Config::load_from_root(temp.path());
        assert!(matches!(result, Err(NestError::Config { .. })));
        Ok(())
    }

    #[test]
    fn test_merge_dir_must_be_plain_name() {
        assert!(validate_merge_dir_name("_consolidated").is_ok());
        assert!(validate_merge_dir_name("a/b").is_err());
        assert!(validate_merge_dir_name("..").is_err());
        assert!(validate_merge_dir_name("  ").is_err());
    }
}
