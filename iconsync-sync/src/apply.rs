//! Change appliers: decide and perform the filesystem mutation for one
//! change-set entry.
//!
//! Each applier returns an [`EntryOutcome`] for the batcher to act on.
//! `Err` is reserved for failures the applier does not know how to handle;
//! the batcher treats those as fatal for the rest of the batch.

use std::path::{Path, PathBuf};

use iconsync_core::{ContentRef, RepoPathMap};

use crate::{
    error::io_err,
    repo::relative_to_repo,
    report::{Reporter, SyncEvent},
    SyncError,
};

/// What the batcher should do with an entry after its applier ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Handled; nothing to stage.
    Handled,
    /// Handled; stage `path` (relative to `repo_root`).
    Stage { repo_root: PathBuf, path: String },
    /// Not handled; keep the entry for the next run.
    Retry,
}

/// Apply one "added" entry.
///
/// `target_repo` maps the destination file to the root of the repository
/// that owns it. It is only consulted when the destination does not exist
/// yet: a collision is resolved in favour of the source without staging,
/// since the file is not new from the target repository's point of view.
/// A destination occupied by anything but a regular file is reported and
/// retried.
pub fn apply_added(
    path: &str,
    source: &RepoPathMap,
    target_dir: &Path,
    target_repo: &dyn Fn(&Path) -> PathBuf,
    reporter: &dyn Reporter,
) -> Result<EntryOutcome, SyncError> {
    let source_file = &lookup(source, path, "source")?.file;
    let target = target_dir.join(path);

    if target.exists() && !target.is_file() {
        reporter.report(&SyncEvent::NotAFile { file: target });
        return Ok(EntryOutcome::Retry);
    }

    if target.is_file() {
        reporter.report(&SyncEvent::AlreadyExists {
            path: path.to_string(),
        });
        if files_identical(source_file, &target)? {
            reporter.report(&SyncEvent::AlreadySynced {
                path: path.to_string(),
            });
        } else {
            copy_file(source_file, &target)?;
        }
        return Ok(EntryOutcome::Handled);
    }

    copy_file(source_file, &target)?;
    let repo_root = target_repo(&target);
    let rel = relative_to_repo(&target, &repo_root)?;
    Ok(EntryOutcome::Stage {
        repo_root,
        path: rel,
    })
}

/// Apply one "modified" entry.
///
/// Equal hashes mean the classification was stale: no bytes are copied.
pub fn apply_modified(
    path: &str,
    target: &RepoPathMap,
    source: &RepoPathMap,
    reporter: &dyn Reporter,
) -> Result<EntryOutcome, SyncError> {
    let target = lookup(target, path, "target")?;
    let source = lookup(source, path, "source")?;

    if target.same_content(source) {
        reporter.report(&SyncEvent::NotModified {
            path: path.to_string(),
        });
        return Ok(EntryOutcome::Handled);
    }

    copy_file(&source.file, &target.file)?;
    Ok(EntryOutcome::Stage {
        repo_root: target.repo_root.clone(),
        path: target.relative_path.clone(),
    })
}

/// Apply one "removed" entry.
///
/// A failed delete is reported and retried on a later run. After a
/// successful delete the parent directory is pruned if it became empty.
pub fn apply_removed(
    path: &str,
    target: &RepoPathMap,
    reporter: &dyn Reporter,
) -> Result<EntryOutcome, SyncError> {
    let Some(content) = target.get(path) else {
        reporter.report(&SyncEvent::AlreadyRemoved {
            path: path.to_string(),
        });
        return Ok(EntryOutcome::Handled);
    };

    if let Err(err) = std::fs::remove_file(&content.file) {
        reporter.report(&SyncEvent::DeleteFailed {
            file: content.file.clone(),
            reason: err.to_string(),
        });
        return Ok(EntryOutcome::Retry);
    }

    if let Some(parent) = content.file.parent() {
        prune_if_empty(parent);
    }
    Ok(EntryOutcome::Stage {
        repo_root: content.repo_root.clone(),
        path: content.relative_path.clone(),
    })
}

/// Byte-for-byte comparison of two files.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, SyncError> {
    let len_a = std::fs::metadata(a).map_err(|e| io_err(a, e))?.len();
    let len_b = std::fs::metadata(b).map_err(|e| io_err(b, e))?.len();
    if len_a != len_b {
        return Ok(false);
    }
    let bytes_a = std::fs::read(a).map_err(|e| io_err(a, e))?;
    let bytes_b = std::fs::read(b).map_err(|e| io_err(b, e))?;
    Ok(bytes_a == bytes_b)
}

fn lookup<'m>(
    map: &'m RepoPathMap,
    path: &str,
    side: &'static str,
) -> Result<&'m ContentRef, SyncError> {
    map.get(path).ok_or_else(|| SyncError::MissingEntry {
        path: path.to_string(),
        side,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), SyncError> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::copy(from, to).map_err(|e| io_err(to, e))?;
    tracing::debug!("copied {} -> {}", from.display(), to.display());
    Ok(())
}

// Cosmetic: errors are ignored and the directory is not staged.
fn prune_if_empty(dir: &Path) {
    let empty = std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if empty {
        if let Err(err) = std::fs::remove_dir(dir) {
            tracing::debug!("could not prune {}: {err}", dir.display());
        }
    }
}
