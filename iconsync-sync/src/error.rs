//! Error types for iconsync-sync.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from scanning, reconciling and staging.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (baseline store).
    #[error("baseline JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error from libgit2 while staging.
    #[error("git error in {repo}: {source}")]
    Git {
        repo: PathBuf,
        #[source]
        source: git2::Error,
    },

    /// A change-set entry has no counterpart in the path map it must be read from.
    #[error("'{path}' is missing from the {side} path map")]
    MissingEntry { path: String, side: &'static str },

    /// A file that should be staged lies outside its resolved repository.
    #[error("{file} is not inside repository {repo}")]
    OutsideRepo { file: PathBuf, repo: PathBuf },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn git_err(repo: impl Into<PathBuf>, source: git2::Error) -> SyncError {
    SyncError::Git {
        repo: repo.into(),
        source,
    }
}
