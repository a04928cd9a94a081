//! git-nest - command-line entry point
//!
//! Without a mode flag the hierarchy's submodule manifests are synthesized.
//! `--scan`, `--copy`, `--prune`, `--aggressive` and `--restore` select the
//! consolidation pipeline instead.

use anyhow::Result;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use git_nest::commands::{
    self, consolidate_with_output, restore_with_output, scan_with_output, sync_with_output,
    ConsolidateMode, ConsolidateOptions,
};
use git_nest::config::{validate_merge_dir_name, Config};
use git_nest::constants::{
    DEFAULT_LOG_LEVEL, EXIT_FAILURE, LOG_ENV_VAR, PREVIEW_LOG_LEVEL, VERBOSE_LOG_LEVEL,
};
use git_nest::pruner::PruneMode;
use git_nest::utils;

/// Command-line arguments for git-nest
#[derive(Parser, Debug)]
#[command(name = "git-nest", version)]
#[command(
    about = "Synthesize submodule manifests for nested repositories and consolidate transient directories",
    long_about = None
)]
#[command(group(
    ArgGroup::new("mode")
        .args(["scan", "copy", "prune", "aggressive", "restore"])
        .multiple(false)
))]
#[command(group(ArgGroup::new("pruning").args(["prune", "aggressive"])))]
struct Cli {
    /// Hierarchy root (defaults to the current directory)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// List transient directories without changing anything
    #[arg(long)]
    scan: bool,

    /// Copy transient directories into the merge directory and write a record
    #[arg(long)]
    copy: bool,

    /// Replace recorded originals with links to their consolidated copies
    #[arg(long)]
    prune: bool,

    /// Copy, then immediately prune what was copied
    #[arg(long)]
    aggressive: bool,

    /// Move a recycle batch back into place
    #[arg(long, value_name = "STAMP")]
    restore: Option<String>,

    /// Preview every action without modifying the hierarchy
    #[arg(long)]
    dry_run: bool,

    /// Delete originals instead of moving them to the recycle area
    #[arg(long, requires = "pruning")]
    delete: bool,

    /// Merge directory name (overrides the configuration file)
    #[arg(long, value_name = "NAME")]
    merge_dir: Option<String>,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn consolidate_mode(&self) -> Option<ConsolidateMode> {
        if self.copy {
            Some(ConsolidateMode::Copy)
        } else if self.prune {
            Some(ConsolidateMode::Prune)
        } else if self.aggressive {
            Some(ConsolidateMode::Aggressive)
        } else {
            None
        }
    }

    fn prune_mode(&self) -> PruneMode {
        if self.delete {
            PruneMode::Delete
        } else {
            PruneMode::Recycle
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        utils::print_error(&format!("{e:#}"));
        std::process::exit(EXIT_FAILURE);
    }
}

/// Sets up `env_logger`; `RUST_LOG` takes precedence over the flags
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        VERBOSE_LOG_LEVEL
    } else if cli.dry_run || cli.scan {
        PREVIEW_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };

    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV_VAR, level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let root = commands::resolve_root(&cli.root)?;

    let mut config = Config::load_from_root(&root)?;
    if let Some(name) = &cli.merge_dir {
        validate_merge_dir_name(name)?;
        config.consolidate.merge_dir = Some(name.clone());
    }
    let merge_root = config.merge_root(&root);

    if let Some(stamp) = &cli.restore {
        return restore_with_output(&root, &merge_root, stamp, cli.dry_run);
    }

    let mode = cli.consolidate_mode();
    if mode.is_none() && !cli.scan {
        return sync_with_output(&root, &config, cli.dry_run);
    }

    let options = ConsolidateOptions {
        root: root.clone(),
        merge_root,
        mode: mode.unwrap_or(ConsolidateMode::Copy),
        prune_mode: cli.prune_mode(),
        dry_run: cli.dry_run,
        exclusions: config.exclusion_set(),
        patterns: config.pattern_set()?,
    };

    if cli.scan {
        scan_with_output(&options)
    } else {
        consolidate_with_output(&options)
    }
}
