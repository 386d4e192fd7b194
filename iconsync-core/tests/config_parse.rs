//! Parsing hand-written pair files: omitted keys fall back to defaults.

use iconsync_core::{config::default_extensions, PairConfig, RunFlags};
use rstest::rstest;
use std::path::PathBuf;

const MINIMAL: &str = "\
name: icons
design:
  repo: /code/icons
dev:
  repo: /code/ultimate
  dir: platform/icons
created_at: 2024-01-01T00:00:00Z
updated_at: 2024-01-01T00:00:00Z
";

#[test]
fn minimal_file_uses_defaults() {
    let pair: PairConfig = serde_yaml::from_str(MINIMAL).expect("parse");
    assert_eq!(pair.flags, RunFlags::default());
    assert_eq!(pair.extensions, default_extensions());
    assert_eq!(pair.design.dir, None);
    assert_eq!(pair.dev.tree_root(), PathBuf::from("/code/ultimate/platform/icons"));
}

#[rstest]
#[case("sync_dev: true", true, false, false)]
#[case("sync_dev_and_review: true", true, false, false)]
#[case("sync_design: true", false, true, false)]
#[case("sync_design_and_review: true", false, true, false)]
#[case("sync_dev: true\n  sync_removed_in_dev: true", true, false, true)]
fn flags_section_enables_directions(
    #[case] flags: &str,
    #[case] dev: bool,
    #[case] design: bool,
    #[case] removals: bool,
) {
    let yaml = format!("{MINIMAL}flags:\n  {flags}\n");
    let pair: PairConfig = serde_yaml::from_str(&yaml).expect("parse");
    assert_eq!(pair.flags.dev_enabled(), dev, "[{flags}] dev");
    assert_eq!(pair.flags.design_enabled(), design, "[{flags}] design");
    assert_eq!(pair.flags.sync_removed_in_dev, removals, "[{flags}] removals");
}

#[test]
fn empty_extension_list_is_kept() {
    let yaml = format!("{MINIMAL}extensions: []\n");
    let pair: PairConfig = serde_yaml::from_str(&yaml).expect("parse");
    assert!(pair.extensions.is_empty());
}
