//! Working-tree scanner: builds a [`RepoPathMap`] for one side of a pair.
//!
//! Icons are binary, so hashing works on raw bytes with no line-ending
//! normalisation.

use std::fs::DirEntry;
use std::path::Path;

use sha2::{Digest, Sha256};

use iconsync_core::{ContentHash, ContentRef, RepoPathMap};

use crate::{
    error::io_err,
    repo::{nearest_repo_root, relative_to_repo},
    SyncError,
};

/// SHA-256 of the file's bytes, hex-encoded.
pub fn hash_file(path: &Path) -> Result<ContentHash, SyncError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(hash_bytes(&bytes))
}

pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    ContentHash(hex::encode(hasher.finalize()))
}

/// Scan `tree_root` recursively.
///
/// Keys are `/`-separated paths relative to `tree_root`. Each file's owning
/// repository is the nearest enclosing checkout, or `repo_root` if none is
/// found. Hidden entries are skipped; `extensions` filters by file extension
/// (case-insensitive) unless empty. A missing `tree_root` yields an empty map.
pub fn scan_tree(
    tree_root: &Path,
    repo_root: &Path,
    extensions: &[String],
) -> Result<RepoPathMap, SyncError> {
    let mut map = RepoPathMap::new();
    if !tree_root.exists() {
        tracing::debug!("tree root missing, nothing to scan: {}", tree_root.display());
        return Ok(map);
    }
    walk(tree_root, tree_root, repo_root, extensions, &mut map)?;
    tracing::debug!("scanned {} file(s) under {}", map.len(), tree_root.display());
    Ok(map)
}

fn walk(
    dir: &Path,
    tree_root: &Path,
    repo_root: &Path,
    extensions: &[String],
    map: &mut RepoPathMap,
) -> Result<(), SyncError> {
    let entries = visible_entries(dir, std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?)?;

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            walk(&path, tree_root, repo_root, extensions, map)?;
            continue;
        }
        if !file_type.is_file() || !is_tracked(&path, extensions) {
            continue;
        }

        let key = relative_to_repo(&path, tree_root)?;
        let owner = nearest_repo_root(&path, repo_root);
        let content = ContentRef {
            relative_path: relative_to_repo(&path, &owner)?,
            hash: hash_file(&path)?,
            repo_root: owner,
            file: path,
        };
        map.insert(key, content);
    }
    Ok(())
}

/// Non-hidden entries of `dir`, sorted by name.
///
/// An unreadable entry fails the scan: dropping it would make the file look
/// removed.
fn visible_entries(
    dir: &Path,
    entries: impl Iterator<Item = std::io::Result<DirEntry>>,
) -> Result<Vec<DirEntry>, SyncError> {
    let mut visible = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        if !entry.file_name().to_string_lossy().starts_with('.') {
            visible.push(entry);
        }
    }
    visible.sort_by_key(|e| e.file_name());
    Ok(visible)
}

fn is_tracked(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy();
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
}
