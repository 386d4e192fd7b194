//! Staging primitive: enqueue paths for the next commit of a repository.

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::{error::git_err, SyncError};

/// Marks paths as part of the next commit of `repo_root`.
///
/// Paths are relative to `repo_root` and `/`-separated. A path whose
/// working-tree file no longer exists is staged as a deletion.
pub trait Stager {
    fn stage(&mut self, repo_root: &Path, paths: &[String]) -> Result<(), SyncError>;
}

/// Stages into the repository's git index via libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitStager;

impl Stager for GitStager {
    fn stage(&mut self, repo_root: &Path, paths: &[String]) -> Result<(), SyncError> {
        let repo = Repository::open(repo_root).map_err(|e| git_err(repo_root, e))?;
        let mut index = repo.index().map_err(|e| git_err(repo_root, e))?;
        for path in paths {
            let rel = Path::new(path);
            let staged = if repo_root.join(rel).exists() {
                index.add_path(rel)
            } else {
                index.remove_path(rel)
            };
            staged.map_err(|e| git_err(repo_root, e))?;
        }
        index.write().map_err(|e| git_err(repo_root, e))?;
        tracing::debug!("git index updated in {} ({} path(s))", repo_root.display(), paths.len());
        Ok(())
    }
}

/// Records every staging call instead of touching a repository.
#[derive(Debug, Default, Clone)]
pub struct RecordingStager {
    pub calls: Vec<(PathBuf, Vec<String>)>,
}

impl RecordingStager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path staged so far, across calls, in call order.
    pub fn staged_paths(&self) -> Vec<String> {
        self.calls
            .iter()
            .flat_map(|(_, paths)| paths.iter().cloned())
            .collect()
    }
}

impl Stager for RecordingStager {
    fn stage(&mut self, repo_root: &Path, paths: &[String]) -> Result<(), SyncError> {
        self.calls.push((repo_root.to_path_buf(), paths.to_vec()));
        Ok(())
    }
}
