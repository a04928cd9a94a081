//! End-to-end behavior of the `git-nest` binary

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn git_nest() -> Result<Command> {
    let mut cmd = Command::cargo_bin("git-nest")?;
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_help() -> Result<()> {
    git_nest()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--aggressive"))
        .stdout(predicate::str::contains("--restore"));
    Ok(())
}

#[test]
fn test_invalid_root_fails() -> Result<()> {
    let temp = TempDir::new()?;
    git_nest()?
        .arg(temp.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid root directory"));
    Ok(())
}

#[test]
fn test_empty_hierarchy_is_benign() -> Result<()> {
    let temp = TempDir::new()?;
    git_nest()?
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No repositories found"));
    Ok(())
}

#[test]
fn test_sync_writes_manifest() -> Result<()> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("A/.git"))?;
    fs::create_dir_all(temp.path().join("A/libs/B/.git"))?;

    git_nest()?
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("written: 1"));

    let manifest = fs::read_to_string(temp.path().join("A/.gitmodules"))?;
    assert!(manifest.contains("path = libs/B"));
    Ok(())
}

#[test]
fn test_live_prune_without_record_fails() -> Result<()> {
    let temp = TempDir::new()?;
    git_nest()?
        .arg(temp.path())
        .arg("--prune")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Consolidation record not found"));
    Ok(())
}

#[test]
fn test_dry_run_prune_without_record_succeeds() -> Result<()> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("proj/tmp"))?;

    git_nest()?
        .arg(temp.path())
        .args(["--prune", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!temp.path().join("_consolidated").exists());
    Ok(())
}

#[test]
fn test_modes_are_mutually_exclusive() -> Result<()> {
    let temp = TempDir::new()?;
    git_nest()?
        .arg(temp.path())
        .args(["--copy", "--prune"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_delete_without_pruning_mode_is_rejected() -> Result<()> {
    let temp = TempDir::new()?;
    git_nest()?
        .arg(temp.path())
        .args(["--copy", "--delete"])
        .assert()
        .failure();

    assert!(!temp.path().join("_consolidated").exists());
    Ok(())
}

#[test]
fn test_scan_lists_transient_directories() -> Result<()> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("proj/backup"))?;

    git_nest()?
        .arg(temp.path())
        .arg("--scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("proj/backup"));
    Ok(())
}

#[test]
fn test_merge_dir_override() -> Result<()> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("proj/tmp"))?;
    fs::write(temp.path().join("proj/tmp/a.txt"), "a")?;

    git_nest()?
        .arg(temp.path())
        .args(["--copy", "--merge-dir", "stash"])
        .assert()
        .success();

    assert!(temp.path().join("stash/proj/a.txt").is_file());
    assert!(temp.path().join("stash/.consolidation-record").is_file());
    Ok(())
}

#[test]
fn test_malformed_config_fails() -> Result<()> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join(".git-nest.toml"), "[consolidate\nmerge_dir = 1")?;

    git_nest()?
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
    Ok(())
}
