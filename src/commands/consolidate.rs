use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use log::info;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::classifier::ExclusionSet;
use crate::constants::{
    section_header, MSG_DRY_RUN_BANNER, MSG_NO_TRANSIENT_DIRS, RECORD_FILE_NAME,
    SCRATCH_DIR_PREFIX,
};
use crate::error::{NestError, Result as NestResult};
use crate::file_copy::{consolidation_target, copy_matches, CopyReport};
use crate::filesystem::{DryRunFileSystem, FileSystem, RealFileSystem};
use crate::finder::{find_transient_dirs, PatternSet, TransientMatch};
use crate::pruner::{prune, PruneMode, PruneOptions, PruneReport};
use crate::record::ConsolidationRecord;
use crate::recycle::{batch_stamp, RecycleBatch, RestoreReport};
use crate::utils::{self, format_count};

/// Which stages of the consolidation pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsolidateMode {
    /// Copy transient directories into the merge directory
    Copy,
    /// Prune originals listed in the existing record
    Prune,
    /// Copy, then prune the entries just copied
    Aggressive,
}

impl ConsolidateMode {
    fn copies(self) -> bool {
        matches!(self, ConsolidateMode::Copy | ConsolidateMode::Aggressive)
    }

    fn prunes(self) -> bool {
        matches!(self, ConsolidateMode::Prune | ConsolidateMode::Aggressive)
    }
}

/// Settings for one consolidation run
#[derive(Debug, Clone)]
pub struct ConsolidateOptions {
    pub root: PathBuf,
    pub merge_root: PathBuf,
    pub mode: ConsolidateMode,
    pub prune_mode: PruneMode,
    pub dry_run: bool,
    pub exclusions: ExclusionSet,
    pub patterns: PatternSet,
}

impl ConsolidateOptions {
    /// Location of the persistent record
    pub fn record_path(&self) -> PathBuf {
        self.merge_root.join(RECORD_FILE_NAME)
    }
}

/// Reports from the stages that ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationOutcome {
    pub matches: usize,
    pub copy: Option<CopyReport>,
    pub prune: Option<PruneReport>,
    /// Recycle batch label used by the prune stage
    pub stamp: Option<String>,
}

/// A transient directory and where it would be consolidated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub found: TransientMatch,
    pub target: Option<PathBuf>,
}

/// Lists transient directories without touching anything
pub fn execute_scan(options: &ConsolidateOptions) -> Vec<ScanEntry> {
    find(options)
        .into_iter()
        .map(|found| {
            let target = consolidation_target(&found.source_path, &options.merge_root);
            ScanEntry { found, target }
        })
        .collect()
}

fn find(options: &ConsolidateOptions) -> Vec<TransientMatch> {
    find_transient_dirs(
        &options.root,
        &options.patterns,
        &options.exclusions,
        &options.merge_root,
    )
}

/// Runs the copy and/or prune stages selected by `options.mode`
///
/// In dry-run mode every mutation goes through [`DryRunFileSystem`] and the
/// record lives in a scratch directory removed before returning, so the
/// hierarchy is left exactly as it was.
///
/// # Errors
///
/// [`NestError::MissingRecord`] for a live prune with no record; record
/// I/O errors. Per-entry failures are only counted.
pub fn execute_consolidation(options: &ConsolidateOptions) -> NestResult<ConsolidationOutcome> {
    let real = RealFileSystem::new();
    let dry = DryRunFileSystem::new();
    let fs: &dyn FileSystem = if options.dry_run { &dry } else { &real };

    let scratch = if options.dry_run {
        Some(
            tempfile::Builder::new()
                .prefix(SCRATCH_DIR_PREFIX)
                .tempdir()
                .map_err(|e| NestError::io(std::env::temp_dir(), e))?,
        )
    } else {
        None
    };

    let outcome = run_pipeline(options, fs, scratch.as_ref());

    if let Some(scratch) = scratch {
        let path = scratch.path().to_path_buf();
        scratch.close().map_err(|e| NestError::io(path, e))?;
    }

    outcome
}

fn run_pipeline(
    options: &ConsolidateOptions,
    fs: &dyn FileSystem,
    scratch: Option<&TempDir>,
) -> NestResult<ConsolidationOutcome> {
    let mut outcome = ConsolidationOutcome::default();
    let record_path = match scratch {
        Some(dir) => dir.path().join(RECORD_FILE_NAME),
        None => options.record_path(),
    };

    let record = if options.mode.copies() {
        let matches = find(options);
        outcome.matches = matches.len();
        let mut record = ConsolidationRecord::create(&record_path)?;
        outcome.copy = Some(copy_matches(&matches, &options.merge_root, fs, &mut record)?);
        record
    } else {
        load_record_for_prune(options, fs, &record_path, &mut outcome)?
    };

    if options.mode.prunes() {
        let stamp = batch_stamp(Local::now());
        let prune_options = PruneOptions {
            root: options.root.clone(),
            merge_root: options.merge_root.clone(),
            mode: options.prune_mode,
            stamp: stamp.clone(),
        };
        outcome.prune = Some(prune(&record, &prune_options, fs));
        outcome.stamp = Some(stamp);
    }

    Ok(outcome)
}

/// The record a prune-only run acts on
///
/// A dry run without a persisted record previews the copy stage into the
/// scratch record so the prune preview has entries to act on.
fn load_record_for_prune(
    options: &ConsolidateOptions,
    fs: &dyn FileSystem,
    scratch_record: &Path,
    outcome: &mut ConsolidationOutcome,
) -> NestResult<ConsolidationRecord> {
    match ConsolidationRecord::load(&options.record_path()) {
        Ok(record) => Ok(record),
        Err(NestError::MissingRecord { .. }) if options.dry_run => {
            info!("No record found, previewing copy stage into a scratch record");
            let matches = find(options);
            outcome.matches = matches.len();
            let mut record = ConsolidationRecord::create(scratch_record)?;
            outcome.copy = Some(copy_matches(&matches, &options.merge_root, fs, &mut record)?);
            Ok(record)
        }
        Err(e) => Err(e),
    }
}

/// Moves a recycle batch back into place
pub fn execute_restore(
    root: &Path,
    merge_root: &Path,
    stamp: &str,
    dry_run: bool,
) -> NestResult<RestoreReport> {
    let batch = RecycleBatch::new(merge_root, stamp, root);
    if !batch.dir().is_dir() {
        return Err(NestError::MissingRecord {
            path: batch.dir().to_path_buf(),
        });
    }

    let real = RealFileSystem::new();
    let dry = DryRunFileSystem::new();
    let fs: &dyn FileSystem = if dry_run { &dry } else { &real };
    crate::recycle::restore_batch(&batch, fs)
}

/// Runs [`execute_scan`] and prints each match
pub fn scan_with_output(options: &ConsolidateOptions) -> Result<()> {
    println!("{}", section_header("Transient directories"));

    let entries = execute_scan(options);
    if entries.is_empty() {
        utils::print_info(MSG_NO_TRANSIENT_DIRS);
        return Ok(());
    }

    for entry in &entries {
        let source = display_relative(&entry.found.source_path, &options.root);
        let target = entry
            .target
            .as_ref()
            .map(|t| display_relative(t, &options.root))
            .unwrap_or_else(|| "-".to_string());
        utils::print_item(&format!(
            "{} [{}] -> {}",
            source.bright_white(),
            entry.found.pattern.bright_black(),
            target
        ));
    }
    utils::print_success(&format_count("transient directories", entries.len()));
    Ok(())
}

/// Runs [`execute_consolidation`] and prints the stage reports
pub fn consolidate_with_output(options: &ConsolidateOptions) -> Result<()> {
    println!("{}", section_header("Consolidation"));
    if options.dry_run {
        utils::print_info(MSG_DRY_RUN_BANNER);
    }

    let outcome = execute_consolidation(options).with_context(|| {
        format!(
            "Consolidation failed under {}",
            options.root.display()
        )
    })?;

    if let Some(copy) = outcome.copy {
        if outcome.matches == 0 {
            utils::print_info(MSG_NO_TRANSIENT_DIRS);
        }
        utils::print_success(&format!(
            "Copy  {}  {}  {}",
            format_count("copied", copy.copied),
            format_count("files", copy.files),
            format_count("skipped", copy.skipped)
        ));
        if !options.dry_run && options.mode == ConsolidateMode::Copy {
            utils::print_info(&format!(
                "Record written to {}",
                options.record_path().display()
            ));
        }
    }

    if let Some(report) = outcome.prune {
        let line = format!(
            "Prune ({})  {}  {}  {}",
            options.prune_mode,
            format_count("processed", report.processed),
            format_count("pruned", report.pruned),
            format_count("skipped", report.skipped)
        );
        if report.skipped > 0 {
            utils::print_warning(&line);
        } else {
            utils::print_success(&line);
        }
        if let (PruneMode::Recycle, Some(stamp), false) =
            (options.prune_mode, &outcome.stamp, options.dry_run)
        {
            if report.pruned > 0 {
                utils::print_info(&format!(
                    "Originals kept in recycle batch {stamp} (undo with --restore {stamp})"
                ));
            }
        }
    }

    Ok(())
}

/// Runs [`execute_restore`] and prints the report
pub fn restore_with_output(
    root: &Path,
    merge_root: &Path,
    stamp: &str,
    dry_run: bool,
) -> Result<()> {
    println!("{}", section_header("Restore"));
    if dry_run {
        utils::print_info(MSG_DRY_RUN_BANNER);
    }

    let report = execute_restore(root, merge_root, stamp, dry_run)
        .with_context(|| format!("Cannot restore recycle batch '{stamp}'"))?;

    let line = format!(
        "{}  {}  {}",
        format_count("processed", report.processed),
        format_count("restored", report.restored),
        format_count("skipped", report.skipped)
    );
    if report.skipped > 0 {
        utils::print_warning(&line);
    } else {
        utils::print_success(&line);
    }
    Ok(())
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
