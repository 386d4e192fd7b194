//! Per-pair YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.iconsync/
//!   pairs/               (mode 0700)
//!     <pair_name>.yaml   (one file per repository pair, mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function touching the home directory has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which directions a run executes.
///
/// The `*_and_review` variants enable the same underlying sync as their plain
/// counterparts; the review itself is created outside this tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFlags {
    #[serde(default)]
    pub sync_dev: bool,
    #[serde(default)]
    pub sync_dev_and_review: bool,
    #[serde(default)]
    pub sync_design: bool,
    #[serde(default)]
    pub sync_design_and_review: bool,
    /// Propagate designer removals into the dev repository.
    #[serde(default)]
    pub sync_removed_in_dev: bool,
}

impl RunFlags {
    /// Designer → dev direction enabled.
    pub fn dev_enabled(&self) -> bool {
        self.sync_dev || self.sync_dev_and_review
    }

    /// Dev → designer direction enabled.
    pub fn design_enabled(&self) -> bool {
        self.sync_design || self.sync_design_and_review
    }

    /// Field-wise OR, used to layer CLI switches over stored flags.
    pub fn union(self, other: RunFlags) -> RunFlags {
        RunFlags {
            sync_dev: self.sync_dev || other.sync_dev,
            sync_dev_and_review: self.sync_dev_and_review || other.sync_dev_and_review,
            sync_design: self.sync_design || other.sync_design,
            sync_design_and_review: self.sync_design_and_review || other.sync_design_and_review,
            sync_removed_in_dev: self.sync_removed_in_dev || other.sync_removed_in_dev,
        }
    }
}

/// One side of a pair: a repository and the icon tree inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSide {
    /// Absolute path to the repository root.
    pub repo: PathBuf,
    /// Icon tree root, relative to `repo`. Defaults to the repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Display name used in log output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RepoSide {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            dir: None,
            label: None,
        }
    }

    /// Directory whose relative paths form the keys of this side's path map.
    pub fn tree_root(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => self.repo.join(dir),
            None => self.repo.clone(),
        }
    }

    pub fn display_name(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        self.repo
            .file_name()
            .unwrap_or_else(|| self.repo.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

/// A designer repository paired with a dev repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    pub name: String,
    /// The designers' repository: source of truth for the dev → design direction.
    pub design: RepoSide,
    pub dev: RepoSide,
    /// Default run flags; CLI switches are OR-ed on top.
    #[serde(default)]
    pub flags: RunFlags,
    /// Tracked file extensions without the dot. Empty tracks every file.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn default_extensions() -> Vec<String> {
    vec!["svg".to_string(), "png".to_string()]
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.iconsync/pairs/`: pure, no I/O.
pub fn pairs_dir_at(home: &Path) -> PathBuf {
    home.join(".iconsync").join("pairs")
}

/// `<home>/.iconsync/pairs/<name>.yaml`: pure, no I/O.
pub fn pair_path_at(home: &Path, name: &str) -> PathBuf {
    pairs_dir_at(home).join(format!("{name}.yaml"))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load a pair from `<home>/.iconsync/pairs/<name>.yaml`.
///
/// Returns `ConfigError::PairNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path, name: &str) -> Result<PairConfig, ConfigError> {
    let path = pair_path_at(home, name);
    if !path.exists() {
        return Err(ConfigError::PairNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load(name: &str) -> Result<PairConfig, ConfigError> {
    load_at(&home()?, name)
}

/// Every pair under `<home>/.iconsync/pairs/`, sorted by name.
pub fn list_at(home: &Path) -> Result<Vec<PairConfig>, ConfigError> {
    let dir = pairs_dir_at(home);
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut entries: Vec<_> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".yaml"))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut pairs = Vec::new();
    for entry in entries {
        let contents = std::fs::read_to_string(entry.path())?;
        let pair: PairConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: entry.path(),
            source: e,
        })?;
        pairs.push(pair);
    }
    Ok(pairs)
}

/// `list_at` convenience wrapper.
pub fn list() -> Result<Vec<PairConfig>, ConfigError> {
    list_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save a pair to `<home>/.iconsync/pairs/<name>.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, pair: &PairConfig) -> Result<(), ConfigError> {
    let dir = pairs_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = pair_path_at(home, &pair.name);
    let tmp_path = path.with_file_name(format!("{}.yaml.tmp", pair.name));

    let yaml = serde_yaml::to_string(pair)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(pair: &PairConfig) -> Result<(), ConfigError> {
    save_at(&home()?, pair)
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Register a pair named `name`.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
/// `extensions` of `None` uses [`default_extensions`].
pub fn init_at(
    home: &Path,
    name: &str,
    design: RepoSide,
    dev: RepoSide,
    extensions: Option<Vec<String>>,
) -> Result<PairConfig, ConfigError> {
    if pair_path_at(home, name).exists() {
        return load_at(home, name);
    }

    let now = Utc::now();
    let pair = PairConfig {
        name: name.to_string(),
        design,
        dev,
        flags: RunFlags::default(),
        extensions: extensions.unwrap_or_else(default_extensions),
        created_at: now,
        updated_at: now,
    };
    save_at(home, &pair)?;
    Ok(pair)
}

/// `init_at` convenience wrapper.
pub fn init(
    name: &str,
    design: RepoSide,
    dev: RepoSide,
    extensions: Option<Vec<String>>,
) -> Result<PairConfig, ConfigError> {
    init_at(&home()?, name, design, dev, extensions)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
