//! iconsync core library: value types, pair configuration, errors.
//!
//! - [`types`]: content references, path maps and change sets
//! - [`config`]: per-pair YAML configuration (load / save / init)
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{PairConfig, RepoSide, RunFlags};
pub use error::ConfigError;
pub use types::{ChangeKind, ChangeSet, ContentHash, ContentRef, Direction, RepoPathMap};
