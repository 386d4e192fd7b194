//! # iconsync-sync
//!
//! Reconciliation engine for a designer icon repository and a dev repository.
//!
//! Call [`pipeline::run`] to scan, classify and reconcile a configured pair,
//! or drive a [`Reconciler`] directly with pre-built path maps and change sets.

pub mod apply;
pub mod baseline;
pub mod batch;
pub mod classify;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod repo;
pub mod report;
pub mod scan;
pub mod stage;

pub use apply::EntryOutcome;
pub use batch::{apply_batch, BatchReport};
pub use error::SyncError;
pub use reconcile::{DirectionReport, Reconciler, SyncContext, Tree};
pub use report::{LogReporter, RecordingReporter, Reporter, SyncEvent};
pub use stage::{GitStager, RecordingStager, Stager};
