//! Domain types shared by the scanner, classifier and reconciler.
//!
//! All filesystem locations use `PathBuf`. Keys of a [`RepoPathMap`] and
//! entries of a [`ChangeSet`] are `/`-separated paths relative to the root of
//! the scanned icon tree, so the same key addresses the same logical asset on
//! both sides of a pair.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Hex-encoded SHA-256 digest of a file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContentHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Content reference
// ---------------------------------------------------------------------------

/// One version of one tracked file inside one repository.
///
/// Never mutated after a scan: a changed file yields a new reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    /// Absolute location of the file on disk.
    pub file: PathBuf,
    /// Root of the repository that owns the file.
    pub repo_root: PathBuf,
    /// `/`-separated path of the file relative to `repo_root`.
    pub relative_path: String,
    pub hash: ContentHash,
}

impl ContentRef {
    /// Hash equality. Authoritative for "was this file modified".
    pub fn same_content(&self, other: &ContentRef) -> bool {
        self.hash == other.hash
    }
}

/// Tree-relative path → content reference, one per repository side.
pub type RepoPathMap = BTreeMap<String, ContentRef>;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The three change kinds a [`ChangeSet`] classifies paths into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Application order used by the reconciler.
    pub fn all() -> &'static [ChangeKind] {
        &[ChangeKind::Added, ChangeKind::Modified, ChangeKind::Removed]
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Removed => write!(f, "removed"),
        }
    }
}

/// The two supported synchronization directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Designer changes flow into the dev repository.
    DesignToDev,
    /// Developer changes flow back into the designer repository.
    DevToDesign,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::DesignToDev => write!(f, "design → dev"),
            Direction::DevToDesign => write!(f, "dev → design"),
        }
    }
}

// ---------------------------------------------------------------------------
// Change set
// ---------------------------------------------------------------------------

/// Pending directional sync: added / modified / removed tree-relative paths.
///
/// The three sets are expected to be pairwise disjoint. Reconciliation
/// removes entries as they are handled, so after a run only the entries that
/// must be retried remain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub added: BTreeSet<String>,
    #[serde(default)]
    pub modified: BTreeSet<String>,
    #[serde(default)]
    pub removed: BTreeSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, kind: ChangeKind) -> &BTreeSet<String> {
        match kind {
            ChangeKind::Added => &self.added,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Removed => &self.removed,
        }
    }

    pub fn set_mut(&mut self, kind: ChangeKind) -> &mut BTreeSet<String> {
        match kind {
            ChangeKind::Added => &mut self.added,
            ChangeKind::Modified => &mut self.modified,
            ChangeKind::Removed => &mut self.removed,
        }
    }

    pub fn insert(&mut self, kind: ChangeKind, path: impl Into<String>) -> bool {
        self.set_mut(kind).insert(path.into())
    }

    /// Drop `path` from whichever set holds it.
    pub fn remove(&mut self, path: &str) -> bool {
        let mut removed = false;
        for kind in ChangeKind::all() {
            removed |= self.set_mut(*kind).remove(path);
        }
        removed
    }

    pub fn contains(&self, path: &str) -> bool {
        self.kind_of(path).is_some()
    }

    /// The kind `path` is classified as, if any.
    pub fn kind_of(&self, path: &str) -> Option<ChangeKind> {
        ChangeKind::all()
            .iter()
            .copied()
            .find(|kind| self.set(*kind).contains(path))
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every path present in more than one set.
    pub fn overlapping(&self) -> BTreeSet<String> {
        let mut overlap: BTreeSet<String> = self.added.intersection(&self.modified).cloned().collect();
        overlap.extend(self.added.intersection(&self.removed).cloned());
        overlap.extend(self.modified.intersection(&self.removed).cloned());
        overlap
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
