//! Staging batcher: drives one applier over one change-set partition.
//!
//! Entries leave the pending set only once their applier reports them
//! handled, so a failed or aborted batch can simply be run again. Staged
//! paths are grouped per repository and flushed with one staging call per
//! repository once every entry has been visited. Repositories are flushed in
//! the order they were first seen.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use iconsync_core::ChangeKind;

use crate::{
    apply::EntryOutcome,
    report::{Reporter, SyncEvent},
    stage::Stager,
    SyncError,
};

/// Outcome of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub kind: ChangeKind,
    /// Entries removed from the pending set.
    pub handled: usize,
    /// Entries left pending by their applier.
    pub retried: usize,
    /// One element per staging call, in call order.
    pub staged: Vec<(PathBuf, Vec<String>)>,
    /// Set when an unexpected error stopped the batch.
    pub aborted: Option<String>,
}

impl BatchReport {
    fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            handled: 0,
            retried: 0,
            staged: Vec::new(),
            aborted: None,
        }
    }

    pub fn staged_count(&self) -> usize {
        self.staged.iter().map(|(_, paths)| paths.len()).sum()
    }
}

/// Run `apply` over every entry of `pending`, then flush staging.
///
/// Any `Err` from `apply` or from the stager ends the batch: entries not yet
/// visited stay pending, entries already handled stay removed, and nothing
/// is staged. The error is reported, never returned.
pub fn apply_batch<F>(
    kind: ChangeKind,
    pending: &mut BTreeSet<String>,
    stager: &mut dyn Stager,
    reporter: &dyn Reporter,
    mut apply: F,
) -> BatchReport
where
    F: FnMut(&str) -> Result<EntryOutcome, SyncError>,
{
    let mut report = BatchReport::new(kind);
    if let Err(err) = run(pending, stager, reporter, &mut apply, &mut report) {
        let error = err.to_string();
        reporter.report(&SyncEvent::BatchAborted {
            kind,
            error: error.clone(),
        });
        report.aborted = Some(error);
    }
    report
}

fn run<F>(
    pending: &mut BTreeSet<String>,
    stager: &mut dyn Stager,
    reporter: &dyn Reporter,
    apply: &mut F,
    report: &mut BatchReport,
) -> Result<(), SyncError>
where
    F: FnMut(&str) -> Result<EntryOutcome, SyncError>,
{
    let mut to_stage: Vec<(PathBuf, Vec<String>)> = Vec::new();

    // Traverse a snapshot so handled entries can be removed as we go.
    let snapshot: Vec<String> = pending.iter().cloned().collect();
    for entry in snapshot {
        match apply(&entry)? {
            EntryOutcome::Handled => {
                pending.remove(&entry);
                report.handled += 1;
            }
            EntryOutcome::Stage { repo_root, path } => {
                pending.remove(&entry);
                report.handled += 1;
                match to_stage.iter_mut().find(|(repo, _)| *repo == repo_root) {
                    Some((_, paths)) => paths.push(path),
                    None => to_stage.push((repo_root, vec![path])),
                }
            }
            EntryOutcome::Retry => report.retried += 1,
        }
    }

    for (repo, paths) in to_stage {
        stager.stage(&repo, &paths)?;
        reporter.report(&SyncEvent::Staged {
            repo: repo.clone(),
            count: paths.len(),
        });
        report.staged.push((repo, paths));
    }
    Ok(())
}
