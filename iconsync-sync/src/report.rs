//! Reporter capability injected into the appliers and the batcher.
//!
//! The core never logs directly; it describes what happened with a
//! [`SyncEvent`] and lets the reporter decide where that goes.

use std::cell::RefCell;
use std::path::PathBuf;

use iconsync_core::{ChangeKind, Direction};

/// Everything the reconciliation core has to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A direction is about to run against `repo`.
    Syncing { direction: Direction, repo: String },
    /// An added path already exists at the destination.
    AlreadyExists { path: String },
    /// An added path already exists with identical bytes.
    AlreadySynced { path: String },
    /// A modified path turned out to have equal hashes.
    NotModified { path: String },
    /// A removed path is already absent from the target.
    AlreadyRemoved { path: String },
    /// Deleting a target file failed; the entry stays pending.
    DeleteFailed { file: PathBuf, reason: String },
    /// Something other than a regular file occupies an added path's
    /// destination; the entry stays pending.
    NotAFile { file: PathBuf },
    /// Paths were handed to the staging primitive.
    Staged { repo: PathBuf, count: usize },
    /// An unexpected error stopped a batch early.
    BatchAborted { kind: ChangeKind, error: String },
    /// A path was changed differently in both repositories.
    Conflict { path: String },
}

pub trait Reporter {
    fn report(&self, event: &SyncEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: &SyncEvent) {
        match event {
            SyncEvent::Syncing { direction, repo } => {
                tracing::info!("syncing {repo} ({direction})")
            }
            SyncEvent::AlreadyExists { path } => {
                tracing::info!("{path} already exists in target repo")
            }
            SyncEvent::AlreadySynced { path } => tracing::info!("skipping {path}"),
            SyncEvent::NotModified { path } => {
                tracing::info!("{path} is not modified, skipping")
            }
            SyncEvent::AlreadyRemoved { path } => {
                tracing::info!("{path} is already removed, skipping")
            }
            SyncEvent::DeleteFailed { file, reason } => {
                tracing::warn!("failed to delete {}: {reason}", file.display())
            }
            SyncEvent::NotAFile { file } => {
                tracing::warn!("{} exists but is not a file, leaving it for a later run", file.display())
            }
            SyncEvent::Staged { repo, count } => {
                tracing::debug!("staged {count} path(s) in {}", repo.display())
            }
            SyncEvent::BatchAborted { kind, error } => {
                tracing::error!("{kind} batch aborted: {error}")
            }
            SyncEvent::Conflict { path } => {
                tracing::warn!("{path} changed in both repositories, leaving it alone")
            }
        }
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<SyncEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.borrow().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &SyncEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
