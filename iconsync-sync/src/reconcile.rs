//! Directional reconciler.
//!
//! Composes the three appliers for one direction in a fixed order (added,
//! then modified, then removed) and gates each direction behind its run
//! flags. Each direction runs at most once per call; resumability comes from
//! the entries left behind in the change sets.

use std::path::{Path, PathBuf};

use serde::Serialize;

use iconsync_core::{ChangeKind, ChangeSet, Direction, RepoPathMap, RunFlags};

use crate::{
    apply::{apply_added, apply_modified, apply_removed},
    batch::{apply_batch, BatchReport},
    repo::nearest_repo_root,
    report::{Reporter, SyncEvent},
    stage::Stager,
};

/// One side of a pair as scanned for this run.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Directory the map keys are relative to.
    pub root: PathBuf,
    /// Repository configured for this side.
    pub repo_root: PathBuf,
    pub label: String,
    pub map: RepoPathMap,
}

/// Everything one run reconciles. Change sets are drained in place.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub design: Tree,
    pub dev: Tree,
    /// Changes to bring into the dev tree.
    pub by_designers: ChangeSet,
    /// Changes to bring back into the design tree.
    pub by_dev: ChangeSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectionReport {
    pub direction: Direction,
    /// One report per applier pass, in application order.
    pub passes: Vec<BatchReport>,
}

impl DirectionReport {
    pub fn staged_count(&self) -> usize {
        self.passes.iter().map(BatchReport::staged_count).sum()
    }

    pub fn aborted(&self) -> bool {
        self.passes.iter().any(|p| p.aborted.is_some())
    }
}

pub struct Reconciler<'a> {
    flags: RunFlags,
    stager: &'a mut dyn Stager,
    reporter: &'a dyn Reporter,
}

impl<'a> Reconciler<'a> {
    pub fn new(flags: RunFlags, stager: &'a mut dyn Stager, reporter: &'a dyn Reporter) -> Self {
        Self {
            flags,
            stager,
            reporter,
        }
    }

    /// Bring designer changes into the dev tree.
    ///
    /// New files are staged in whichever checkout encloses them, so nested
    /// repositories inside the dev tree get their own staging call. Removals
    /// only propagate when `sync_removed_in_dev` is set.
    pub fn sync_dev_repo(&mut self, ctx: &mut SyncContext) -> Option<DirectionReport> {
        if !self.flags.dev_enabled() {
            return None;
        }
        let reporter = self.reporter;
        reporter.report(&SyncEvent::Syncing {
            direction: Direction::DesignToDev,
            repo: ctx.dev.label.clone(),
        });

        let dev_repo = ctx.dev.repo_root.clone();
        let resolve = move |file: &Path| nearest_repo_root(file, &dev_repo);
        let mut passes = Vec::new();

        passes.push(apply_batch(
            ChangeKind::Added,
            &mut ctx.by_designers.added,
            &mut *self.stager,
            reporter,
            |path| apply_added(path, &ctx.design.map, &ctx.dev.root, &resolve, reporter),
        ));
        passes.push(apply_batch(
            ChangeKind::Modified,
            &mut ctx.by_designers.modified,
            &mut *self.stager,
            reporter,
            |path| apply_modified(path, &ctx.dev.map, &ctx.design.map, reporter),
        ));
        if self.flags.sync_removed_in_dev {
            passes.push(apply_batch(
                ChangeKind::Removed,
                &mut ctx.by_designers.removed,
                &mut *self.stager,
                reporter,
                |path| apply_removed(path, &ctx.dev.map, reporter),
            ));
        }

        Some(DirectionReport {
            direction: Direction::DesignToDev,
            passes,
        })
    }

    /// Bring developer changes back into the design tree.
    ///
    /// Everything is staged in the design repository; removals always apply.
    pub fn sync_design_repo(&mut self, ctx: &mut SyncContext) -> Option<DirectionReport> {
        if !self.flags.design_enabled() {
            return None;
        }
        let reporter = self.reporter;
        reporter.report(&SyncEvent::Syncing {
            direction: Direction::DevToDesign,
            repo: ctx.design.label.clone(),
        });

        let design_repo = ctx.design.repo_root.clone();
        let resolve = move |_: &Path| design_repo.clone();
        let mut passes = Vec::new();

        passes.push(apply_batch(
            ChangeKind::Added,
            &mut ctx.by_dev.added,
            &mut *self.stager,
            reporter,
            |path| apply_added(path, &ctx.dev.map, &ctx.design.root, &resolve, reporter),
        ));
        passes.push(apply_batch(
            ChangeKind::Modified,
            &mut ctx.by_dev.modified,
            &mut *self.stager,
            reporter,
            |path| apply_modified(path, &ctx.design.map, &ctx.dev.map, reporter),
        ));
        passes.push(apply_batch(
            ChangeKind::Removed,
            &mut ctx.by_dev.removed,
            &mut *self.stager,
            reporter,
            |path| apply_removed(path, &ctx.design.map, reporter),
        ));

        Some(DirectionReport {
            direction: Direction::DevToDesign,
            passes,
        })
    }
}
