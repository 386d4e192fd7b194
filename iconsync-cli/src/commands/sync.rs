//! `iconsync sync`: apply pending changes and stage them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use iconsync_core::{config, ChangeSet, Direction, PairConfig, RunFlags};
use iconsync_sync::{
    pipeline::{self, RunReport},
    GitStager, LogReporter, RecordingStager, Stager,
};

/// Arguments for `iconsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Name of the pair to sync (omit when using `--all`).
    pub pair: Option<String>,

    /// Sync every registered pair.
    #[arg(long, conflicts_with = "pair")]
    pub all: bool,

    /// Bring designer changes into the dev repository.
    #[arg(long)]
    pub dev: bool,

    /// Same as `--dev`, for runs that end in a code review.
    #[arg(long)]
    pub dev_review: bool,

    /// Bring developer changes back into the designer repository.
    #[arg(long)]
    pub design: bool,

    /// Same as `--design`, for runs that end in a review.
    #[arg(long)]
    pub design_review: bool,

    /// Also delete icons from the dev repository that designers removed.
    #[arg(long)]
    pub removals: bool,

    /// Show what would change without touching either repository.
    #[arg(long)]
    pub dry_run: bool,

    /// Apply changes but leave the git index untouched.
    #[arg(long)]
    pub no_stage: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;

        let pairs = if self.all {
            let pairs = config::list_at(&home).context("failed to load pair configs")?;
            if pairs.is_empty() {
                println!("No pairs registered. Run `iconsync init` first.");
            }
            pairs
        } else {
            let name = self
                .pair
                .clone()
                .context("provide a pair name or use --all")?;
            vec![config::load_at(&home, &name)
                .with_context(|| format!("unknown pair '{name}'; run `iconsync init` first"))?]
        };

        let mut aborted = 0;
        for pair in &pairs {
            let report = self
                .sync_pair(&home, pair)
                .with_context(|| format!("sync failed for '{}'", pair.name))?;
            aborted += report
                .directions
                .iter()
                .flat_map(|d| d.passes.iter())
                .filter(|p| p.aborted.is_some())
                .count();
            print_report(&report);
        }

        if aborted > 0 {
            bail!("{aborted} batch(es) aborted; pending entries are kept, rerun to retry");
        }
        Ok(())
    }

    fn cli_flags(&self) -> RunFlags {
        RunFlags {
            sync_dev: self.dev,
            sync_dev_and_review: self.dev_review,
            sync_design: self.design,
            sync_design_and_review: self.design_review,
            sync_removed_in_dev: self.removals,
        }
    }

    fn sync_pair(&self, home: &Path, pair: &PairConfig) -> Result<RunReport> {
        let flags = pair.flags.union(self.cli_flags());
        if !self.dry_run && !flags.dev_enabled() && !flags.design_enabled() {
            println!(
                "'{}': no direction enabled; pass --dev and/or --design (or set flags in the pair config)",
                pair.name
            );
        }

        let mut git = GitStager;
        let mut recording = RecordingStager::new();
        let stager: &mut dyn Stager = if self.no_stage { &mut recording } else { &mut git };

        Ok(pipeline::run(
            home,
            pair,
            flags,
            stager,
            &LogReporter,
            self.dry_run,
        )?)
    }
}

fn print_report(report: &RunReport) {
    let name = &report.pair;
    if report.dry_run {
        print_pending("[dry-run] ", name, Direction::DesignToDev, &report.by_designers);
        print_pending("[dry-run] ", name, Direction::DevToDesign, &report.by_dev);
    } else {
        for direction in &report.directions {
            let handled: usize = direction.passes.iter().map(|p| p.handled).sum();
            println!(
                "✓ '{name}' {}: {handled} handled, {} staged",
                direction.direction,
                direction.staged_count()
            );
            for pass in direction.passes.iter().filter(|p| p.aborted.is_some()) {
                println!(
                    "  ✗ {} aborted: {}",
                    pass.kind,
                    pass.aborted.as_deref().unwrap_or_default()
                );
            }
        }
        let pending = report.by_designers.len() + report.by_dev.len();
        if pending > 0 {
            println!("  {pending} change(s) still pending");
        }
    }

    for path in &report.conflicts {
        println!("  !  {path} changed on both sides; resolve by hand");
    }
}

fn print_pending(prefix: &str, name: &str, direction: Direction, changes: &ChangeSet) {
    if changes.is_empty() {
        println!("{prefix}✓ '{name}' {direction}: nothing to do");
        return;
    }
    println!("{prefix}'{name}' {direction}: {} change(s)", changes.len());
    for path in &changes.added {
        println!("  +  {path}");
    }
    for path in &changes.modified {
        println!("  ~  {path}");
    }
    for path in &changes.removed {
        println!("  -  {path}");
    }
}
