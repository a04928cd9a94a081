use anyhow::Result;
use colored::*;

use crate::config::Config;
use crate::constants::section_header;
use crate::filesystem::{DryRunFileSystem, FileSystem, RealFileSystem};
use crate::git::GitRemoteResolver;
use crate::orchestrator::{Orchestrator, SyncSummary};
use crate::utils::{self, format_count};

use std::path::Path;

/// Synthesizes submodule manifests for every repository under `root`
///
/// `root` must already be resolved (see [`super::resolve_root`]). A
/// hierarchy without repositories is reported as
/// [`crate::error::NestError::NoRepositoriesFound`], which is not fatal.
pub fn execute_sync(root: &Path, config: &Config, dry_run: bool) -> crate::error::Result<SyncSummary> {
    let exclusions = config.exclusion_set();
    let resolver = GitRemoteResolver;
    let real = RealFileSystem::new();
    let dry = DryRunFileSystem::new();
    let fs: &dyn FileSystem = if dry_run { &dry } else { &real };

    Orchestrator::new(root, &exclusions, &resolver, fs).run()
}

/// Runs [`execute_sync`] and prints a summary
pub fn sync_with_output(root: &Path, config: &Config, dry_run: bool) -> Result<()> {
    println!("{}", section_header("Submodule manifests"));

    let summary = match execute_sync(root, config, dry_run) {
        Ok(summary) => summary,
        Err(e) if !e.is_fatal() => {
            utils::print_warning(&e.to_string());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for outcome in &summary.repositories {
        let relative = outcome
            .node
            .path
            .strip_prefix(root)
            .unwrap_or(&outcome.node.path);
        let label = if relative.as_os_str().is_empty() {
            ".".to_string()
        } else {
            relative.display().to_string()
        };
        utils::print_item(&format!(
            "{}{} {} ({} submodule{})",
            "  ".repeat(outcome.depth),
            label.bright_white(),
            outcome.action.to_string().bright_black(),
            outcome.submodules,
            if outcome.submodules == 1 { "" } else { "s" }
        ));
    }

    utils::print_success(&format!(
        "{}  {}  {}  {}",
        format_count("repositories", summary.visited()),
        format_count("written", summary.written()),
        format_count("unchanged", summary.unchanged()),
        format_count("deleted", summary.deleted())
    ));
    Ok(())
}
