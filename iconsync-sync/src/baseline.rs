//! Baseline store: the last snapshot both sides of a pair agreed on.
//!
//! Persists a [`Baseline`] JSON document at
//! `<home>/.iconsync/baselines/<pair_name>.json`.
//! Writes use the same atomic `.tmp` + rename pattern as the pair config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iconsync_core::{ContentHash, RepoPathMap};

use crate::error::{io_err, SyncError};

/// Tree-relative path → hash both repositories held at `synced_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Baseline {
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: BTreeMap<String, ContentHash>,
}

impl Baseline {
    /// Record every path whose content is identical on both sides.
    pub fn from_agreement(design: &RepoPathMap, dev: &RepoPathMap, synced_at: DateTime<Utc>) -> Self {
        let files = design
            .iter()
            .filter(|(key, content)| {
                dev.get(*key)
                    .map(|other| other.same_content(content))
                    .unwrap_or(false)
            })
            .map(|(key, content)| (key.clone(), content.hash.clone()))
            .collect();
        Self {
            synced_at: Some(synced_at),
            files,
        }
    }

    /// Restore `previous` entries for paths that are still pending.
    ///
    /// A change left unapplied must be seen again on the next run, so its
    /// path keeps whatever the previous baseline said about it.
    pub fn carry_forward<'p>(&mut self, previous: &Baseline, pending: impl IntoIterator<Item = &'p String>) {
        for path in pending {
            match previous.files.get(path) {
                Some(hash) => {
                    self.files.insert(path.clone(), hash.clone());
                }
                None => {
                    self.files.remove(path);
                }
            }
        }
    }

    /// Whether a sync has ever completed for this pair.
    ///
    /// A recorded baseline may hold no files at all, when the two sides
    /// agreed on nothing at the last sync.
    pub fn is_recorded(&self) -> bool {
        self.synced_at.is_some()
    }
}

/// Path to the baseline JSON for a given pair, rooted at `home`.
///
/// `~/.iconsync/baselines/<pair_name>.json`
pub fn store_path_at(home: &Path, pair_name: &str) -> PathBuf {
    home.join(".iconsync")
        .join("baselines")
        .join(format!("{pair_name}.json"))
}

/// Load the baseline for `pair_name`.
///
/// Returns an empty baseline if the file does not yet exist.
pub fn load_at(home: &Path, pair_name: &str) -> Result<Baseline, SyncError> {
    let path = store_path_at(home, pair_name);
    if !path.exists() {
        return Ok(Baseline::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the baseline for `pair_name` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_at(home: &Path, pair_name: &str, baseline: &Baseline) -> Result<(), SyncError> {
    let path = store_path_at(home, pair_name);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid baseline path"),
        ));
    };

    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(baseline)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}
