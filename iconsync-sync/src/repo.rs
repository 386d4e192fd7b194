//! Owning-repository resolution.
//!
//! A dev tree may contain nested checkouts, so the repository that owns a
//! file is the closest ancestor directory holding a `.git` entry.

use std::path::{Component, Path, PathBuf};

use crate::SyncError;

/// Closest ancestor of `path` (excluding `path` itself) that contains `.git`.
///
/// Returns `fallback` when no ancestor qualifies. The file itself need not
/// exist yet, which is the case for a freshly added icon.
pub fn nearest_repo_root(path: &Path, fallback: &Path) -> PathBuf {
    path.ancestors()
        .skip(1)
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf())
}

/// `file` relative to `repo_root`, joined with `/`.
pub fn relative_to_repo(file: &Path, repo_root: &Path) -> Result<String, SyncError> {
    let rel = file
        .strip_prefix(repo_root)
        .map_err(|_| SyncError::OutsideRepo {
            file: file.to_path_buf(),
            repo: repo_root.to_path_buf(),
        })?;
    Ok(slash_path(rel))
}

/// Render a relative path with `/` separators regardless of platform.
pub fn slash_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
