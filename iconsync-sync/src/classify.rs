//! Change classification between the two trees of a pair.
//!
//! With a baseline, each side is compared against the last agreed snapshot
//! and the two resulting change sets are attributed to designers and
//! developers respectively. Before the first sync there is no baseline:
//! designers are the source of truth and the dev tree is simply diffed
//! against the design tree.

use std::collections::BTreeSet;

use serde::Serialize;

use iconsync_core::{ChangeKind, ChangeSet, ContentHash, RepoPathMap};

use crate::baseline::Baseline;

/// Pending work for one pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Changes made in the design tree, to be applied to the dev tree.
    pub by_designers: ChangeSet,
    /// Changes made in the dev tree, to be applied to the design tree.
    pub by_dev: ChangeSet,
    /// Paths changed differently on both sides. Never reconciled automatically.
    pub conflicts: BTreeSet<String>,
}

/// Two-way diff: what must happen to `target` for it to match `source`.
pub fn diff(source: &RepoPathMap, target: &RepoPathMap) -> ChangeSet {
    let mut changes = ChangeSet::new();
    for (key, content) in source {
        match target.get(key) {
            None => {
                changes.insert(ChangeKind::Added, key.clone());
            }
            Some(existing) if !existing.same_content(content) => {
                changes.insert(ChangeKind::Modified, key.clone());
            }
            Some(_) => {}
        }
    }
    for key in target.keys() {
        if !source.contains_key(key) {
            changes.insert(ChangeKind::Removed, key.clone());
        }
    }
    changes
}

/// Changes in `current` since `baseline`.
pub fn changes_since(baseline: &Baseline, current: &RepoPathMap) -> ChangeSet {
    let mut changes = ChangeSet::new();
    for (key, content) in current {
        match baseline.files.get(key) {
            None => {
                changes.insert(ChangeKind::Added, key.clone());
            }
            Some(hash) if *hash != content.hash => {
                changes.insert(ChangeKind::Modified, key.clone());
            }
            Some(_) => {}
        }
    }
    for key in baseline.files.keys() {
        if !current.contains_key(key) {
            changes.insert(ChangeKind::Removed, key.clone());
        }
    }
    changes
}

/// Attribute pending changes to designers and developers.
pub fn classify(design: &RepoPathMap, dev: &RepoPathMap, baseline: &Baseline) -> Classification {
    if !baseline.is_recorded() {
        return Classification {
            by_designers: diff(design, dev),
            ..Classification::default()
        };
    }

    let mut by_designers = changes_since(baseline, design);
    let mut by_dev = changes_since(baseline, dev);
    let mut conflicts = BTreeSet::new();

    let touched_by_both: Vec<String> = ChangeKind::all()
        .iter()
        .flat_map(|kind| by_designers.set(*kind).iter())
        .filter(|key| by_dev.kind_of(key).is_some())
        .cloned()
        .collect();

    for key in touched_by_both {
        let design_hash: Option<&ContentHash> = design.get(&key).map(|c| &c.hash);
        let dev_hash: Option<&ContentHash> = dev.get(&key).map(|c| &c.hash);
        if design_hash != dev_hash {
            conflicts.insert(key.clone());
        }
        by_designers.remove(&key);
        by_dev.remove(&key);
    }

    Classification {
        by_designers,
        by_dev,
        conflicts,
    }
}
