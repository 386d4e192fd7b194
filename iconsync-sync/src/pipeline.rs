//! Shared sync pipeline entrypoint used by the CLI.
//!
//! A run is: scan both trees → load the baseline → classify → reconcile
//! (design → dev first, then dev → design) → rescan and save the baseline.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};

use iconsync_core::{ChangeSet, PairConfig, RepoSide, RunFlags};

use crate::{
    baseline::{self, Baseline},
    classify::{classify, Classification},
    reconcile::{DirectionReport, Reconciler, SyncContext, Tree},
    report::{Reporter, SyncEvent},
    scan::scan_tree,
    stage::Stager,
    SyncError,
};

/// Scanned trees plus their classification, before anything is applied.
#[derive(Debug, Clone)]
pub struct Plan {
    pub context: SyncContext,
    pub conflicts: BTreeSet<String>,
    /// When the baseline was last written; `None` on a first run.
    pub baseline_synced_at: Option<DateTime<Utc>>,
    baseline: Baseline,
}

/// Outcome of [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub pair: String,
    pub dry_run: bool,
    /// Reports of the directions that ran, in execution order.
    pub directions: Vec<DirectionReport>,
    /// Designer changes still pending after the run.
    pub by_designers: ChangeSet,
    /// Developer changes still pending after the run.
    pub by_dev: ChangeSet,
    pub conflicts: BTreeSet<String>,
}

/// Scan and classify without touching either tree.
pub fn plan(home: &Path, pair: &PairConfig) -> Result<Plan, SyncError> {
    let design = scan_side(&pair.design, &pair.extensions)?;
    let dev = scan_side(&pair.dev, &pair.extensions)?;
    let baseline = baseline::load_at(home, &pair.name)?;

    let Classification {
        by_designers,
        by_dev,
        conflicts,
    } = classify(&design.map, &dev.map, &baseline);

    Ok(Plan {
        context: SyncContext {
            design,
            dev,
            by_designers,
            by_dev,
        },
        conflicts,
        baseline_synced_at: baseline.synced_at,
        baseline,
    })
}

/// Run one reconciliation of `pair` with `flags`.
///
/// With `dry_run`, stops after classification: nothing is written, staged
/// or persisted, and the returned change sets are the full plan.
pub fn run(
    home: &Path,
    pair: &PairConfig,
    flags: RunFlags,
    stager: &mut dyn Stager,
    reporter: &dyn Reporter,
    dry_run: bool,
) -> Result<RunReport, SyncError> {
    let Plan {
        mut context,
        conflicts,
        baseline: previous,
        ..
    } = plan(home, pair)?;

    for path in &conflicts {
        reporter.report(&SyncEvent::Conflict { path: path.clone() });
    }

    let mut directions = Vec::new();
    if !dry_run {
        let mut reconciler = Reconciler::new(flags, stager, reporter);
        if let Some(report) = reconciler.sync_dev_repo(&mut context) {
            directions.push(report);
            // The dev tree changed; its map is stale for the next direction.
            if flags.design_enabled() {
                context.design.map = scan_tree(&context.design.root, &context.design.repo_root, &pair.extensions)?;
                context.dev.map = scan_tree(&context.dev.root, &context.dev.repo_root, &pair.extensions)?;
            }
        }
        if let Some(report) = reconciler.sync_design_repo(&mut context) {
            directions.push(report);
        }
    }

    if !directions.is_empty() {
        let design = scan_tree(&context.design.root, &context.design.repo_root, &pair.extensions)?;
        let dev = scan_tree(&context.dev.root, &context.dev.repo_root, &pair.extensions)?;
        let mut next = Baseline::from_agreement(&design, &dev, Utc::now());
        let pending = pending_paths(&context.by_designers)
            .chain(pending_paths(&context.by_dev))
            .chain(conflicts.iter());
        next.carry_forward(&previous, pending);
        baseline::save_at(home, &pair.name, &next)?;
        tracing::info!("baseline saved for '{}' ({} path(s))", pair.name, next.files.len());
    }

    Ok(RunReport {
        pair: pair.name.clone(),
        dry_run,
        directions,
        by_designers: context.by_designers,
        by_dev: context.by_dev,
        conflicts,
    })
}

fn scan_side(side: &RepoSide, extensions: &[String]) -> Result<Tree, SyncError> {
    let root = side.tree_root();
    let map = scan_tree(&root, &side.repo, extensions)?;
    Ok(Tree {
        root,
        repo_root: side.repo.clone(),
        label: side.display_name(),
        map,
    })
}

fn pending_paths(changes: &ChangeSet) -> impl Iterator<Item = &String> {
    changes
        .added
        .iter()
        .chain(changes.modified.iter())
        .chain(changes.removed.iter())
}
