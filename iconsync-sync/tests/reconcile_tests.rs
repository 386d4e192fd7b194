use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use iconsync_core::{ChangeKind, ChangeSet, ContentHash, ContentRef, RunFlags};
use iconsync_sync::{
    classify::diff, scan::scan_tree, RecordingReporter, RecordingStager, Reconciler, SyncContext,
    SyncEvent, Tree,
};
use tempfile::TempDir;

fn exts() -> Vec<String> {
    vec!["svg".to_string(), "png".to_string()]
}

fn write(root: &Path, rel: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, bytes).unwrap();
    path
}

fn tree(root: &Path, label: &str) -> Tree {
    Tree {
        root: root.to_path_buf(),
        repo_root: root.to_path_buf(),
        label: label.to_string(),
        map: scan_tree(root, root, &exts()).unwrap(),
    }
}

/// Design and dev trees scanned fresh, with designer changes diffed.
fn context(design: &Path, dev: &Path) -> SyncContext {
    let design = tree(design, "design");
    let dev = tree(dev, "dev");
    let by_designers = diff(&design.map, &dev.map);
    SyncContext {
        design,
        dev,
        by_designers,
        by_dev: ChangeSet::new(),
    }
}

fn dev_flags() -> RunFlags {
    RunFlags {
        sync_dev: true,
        ..RunFlags::default()
    }
}

fn old_time() -> FileTime {
    FileTime::from_system_time(SystemTime::now() - Duration::from_secs(24 * 60 * 60))
}

#[test]
fn disabled_directions_do_nothing() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "a.svg", b"a");
    let mut ctx = context(design.path(), dev.path());

    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    let mut reconciler = Reconciler::new(RunFlags::default(), &mut stager, &reporter);
    assert!(reconciler.sync_dev_repo(&mut ctx).is_none());
    assert!(reconciler.sync_design_repo(&mut ctx).is_none());

    assert_eq!(ctx.by_designers.len(), 1);
    assert!(!dev.path().join("a.svg").exists());
    assert!(stager.calls.is_empty());
    assert!(reporter.events().is_empty());
}

#[test]
fn review_flag_enables_the_same_sync() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "a.svg", b"a");
    let mut ctx = context(design.path(), dev.path());

    let flags = RunFlags {
        sync_dev_and_review: true,
        ..RunFlags::default()
    };
    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    let report = Reconciler::new(flags, &mut stager, &reporter)
        .sync_dev_repo(&mut ctx)
        .expect("direction enabled");

    assert_eq!(report.staged_count(), 1);
    assert_eq!(fs::read(dev.path().join("a.svg")).unwrap(), b"a");
}

#[test]
fn design_to_dev_applies_added_then_modified() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "actions/new.svg", b"new");
    write(design.path(), "actions/changed.svg", b"v2");
    write(dev.path(), "actions/changed.svg", b"v1");
    let mut ctx = context(design.path(), dev.path());

    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    let report = Reconciler::new(dev_flags(), &mut stager, &reporter)
        .sync_dev_repo(&mut ctx)
        .expect("enabled");

    let kinds: Vec<ChangeKind> = report.passes.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![ChangeKind::Added, ChangeKind::Modified]);
    assert_eq!(
        stager.calls,
        vec![
            (dev.path().to_path_buf(), vec!["actions/new.svg".to_string()]),
            (dev.path().to_path_buf(), vec!["actions/changed.svg".to_string()]),
        ]
    );
    assert_eq!(fs::read(dev.path().join("actions/changed.svg")).unwrap(), b"v2");
    assert!(ctx.by_designers.is_empty());
    assert!(matches!(reporter.events()[0], SyncEvent::Syncing { .. }));
}

#[test]
fn dev_removals_are_opt_in() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(dev.path(), "obsolete/old.svg", b"old");

    let mut ctx = context(design.path(), dev.path());
    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    Reconciler::new(dev_flags(), &mut stager, &reporter).sync_dev_repo(&mut ctx);
    assert!(dev.path().join("obsolete/old.svg").exists());
    assert!(ctx.by_designers.removed.contains("obsolete/old.svg"));

    let flags = RunFlags {
        sync_removed_in_dev: true,
        ..dev_flags()
    };
    let mut stager = RecordingStager::new();
    Reconciler::new(flags, &mut stager, &reporter).sync_dev_repo(&mut ctx);
    assert!(!dev.path().join("obsolete").exists(), "emptied directory is pruned");
    assert!(ctx.by_designers.is_empty());
    assert_eq!(stager.staged_paths(), vec!["obsolete/old.svg"]);
}

#[test]
fn dev_to_design_stages_everything_in_design_repo_and_always_removes() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "gone.svg", b"gone");
    write(design.path(), "keep/sibling.svg", b"s");
    write(design.path(), "keep/edited.svg", b"v1");
    write(dev.path(), "keep/sibling.svg", b"s");
    write(dev.path(), "keep/edited.svg", b"v2");
    write(dev.path(), "fresh/new.svg", b"n");

    let design_tree = tree(design.path(), "design");
    let dev_tree = tree(dev.path(), "dev");
    let by_dev = diff(&dev_tree.map, &design_tree.map);
    let mut ctx = SyncContext {
        design: design_tree,
        dev: dev_tree,
        by_designers: ChangeSet::new(),
        by_dev,
    };

    let flags = RunFlags {
        sync_design: true,
        ..RunFlags::default()
    };
    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    let report = Reconciler::new(flags, &mut stager, &reporter)
        .sync_design_repo(&mut ctx)
        .expect("enabled");

    assert_eq!(report.passes.len(), 3);
    assert!(ctx.by_dev.is_empty());
    assert_eq!(fs::read(design.path().join("fresh/new.svg")).unwrap(), b"n");
    assert_eq!(fs::read(design.path().join("keep/edited.svg")).unwrap(), b"v2");
    assert!(!design.path().join("gone.svg").exists());
    assert!(stager.calls.iter().all(|(repo, _)| repo == design.path()));
    assert_eq!(
        stager.staged_paths(),
        vec!["fresh/new.svg", "keep/edited.svg", "gone.svg"]
    );
}

#[test]
fn second_run_is_a_no_op() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "a.svg", b"a");
    write(design.path(), "b.svg", b"b2");
    write(dev.path(), "b.svg", b"b1");
    write(dev.path(), "c.svg", b"c");
    let mut ctx = context(design.path(), dev.path());
    let flags = RunFlags {
        sync_removed_in_dev: true,
        ..dev_flags()
    };
    let reporter = RecordingReporter::new();

    let mut first = RecordingStager::new();
    Reconciler::new(flags, &mut first, &reporter).sync_dev_repo(&mut ctx);
    assert_eq!(first.staged_paths().len(), 3);

    let b = dev.path().join("b.svg");
    set_file_mtime(&b, old_time()).unwrap();
    let before = fs::metadata(&b).unwrap().modified().unwrap();

    let mut second = RecordingStager::new();
    let report = Reconciler::new(flags, &mut second, &reporter)
        .sync_dev_repo(&mut ctx)
        .expect("enabled");
    assert!(second.calls.is_empty());
    assert!(report.passes.iter().all(|p| p.handled == 0));
    assert_eq!(fs::metadata(&b).unwrap().modified().unwrap(), before);
}

#[test]
fn added_with_identical_target_leaves_file_untouched() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "a.svg", b"same");
    let mut ctx = context(design.path(), dev.path());
    // Appears after the diff, so the entry is still classified as added.
    let target = write(dev.path(), "a.svg", b"same");
    set_file_mtime(&target, old_time()).unwrap();
    let before = fs::metadata(&target).unwrap().modified().unwrap();

    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    Reconciler::new(dev_flags(), &mut stager, &reporter).sync_dev_repo(&mut ctx);

    assert_eq!(fs::metadata(&target).unwrap().modified().unwrap(), before);
    assert!(ctx.by_designers.added.is_empty());
    assert!(stager.calls.is_empty());
    assert!(reporter
        .events()
        .contains(&SyncEvent::AlreadySynced { path: "a.svg".to_string() }));
}

#[test]
fn added_collision_overwrites_without_staging() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "a.svg", b"designer");
    let mut ctx = context(design.path(), dev.path());
    write(dev.path(), "a.svg", b"developer");

    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    Reconciler::new(dev_flags(), &mut stager, &reporter).sync_dev_repo(&mut ctx);

    assert_eq!(fs::read(dev.path().join("a.svg")).unwrap(), b"designer");
    assert!(!ctx.by_designers.added.contains("a.svg"));
    assert!(stager.calls.is_empty());
}

#[test]
fn modified_with_equal_hashes_is_authoritative() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "a.svg", b"designer bytes");
    write(dev.path(), "a.svg", b"developer bytes");
    let mut ctx = context(design.path(), dev.path());
    assert!(ctx.by_designers.modified.contains("a.svg"));

    let forced = ContentHash::from("same-hash");
    ctx.design.map.get_mut("a.svg").unwrap().hash = forced.clone();
    ctx.dev.map.get_mut("a.svg").unwrap().hash = forced;

    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    Reconciler::new(dev_flags(), &mut stager, &reporter).sync_dev_repo(&mut ctx);

    assert_eq!(fs::read(dev.path().join("a.svg")).unwrap(), b"developer bytes");
    assert!(ctx.by_designers.modified.is_empty());
    assert!(stager.calls.is_empty());
}

#[test]
fn new_files_are_grouped_by_enclosing_checkout() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    let nested = dev.path().join("community");
    fs::create_dir_all(dev.path().join(".git")).unwrap();
    fs::create_dir_all(nested.join(".git")).unwrap();
    write(design.path(), "community/a1.svg", b"1");
    write(design.path(), "community/a2.svg", b"2");
    write(design.path(), "ultimate/b.svg", b"3");
    let mut ctx = context(design.path(), dev.path());

    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    Reconciler::new(dev_flags(), &mut stager, &reporter).sync_dev_repo(&mut ctx);

    let mut calls = stager.calls.clone();
    calls.sort();
    let mut expected = vec![
        (nested.clone(), vec!["a1.svg".to_string(), "a2.svg".to_string()]),
        (dev.path().to_path_buf(), vec!["ultimate/b.svg".to_string()]),
    ];
    expected.sort();
    assert_eq!(calls, expected);
}

#[test]
fn failed_removal_alone_stays_pending() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(dev.path(), "a.svg", b"a");
    write(dev.path(), "b.svg", b"b");
    write(dev.path(), "c.svg", b"c");
    let mut ctx = context(design.path(), dev.path());
    assert_eq!(ctx.by_designers.removed.len(), 3);

    // A directory now sits where the file was recorded; deleting it as a file fails.
    let blocked = dev.path().join("blocked.svg");
    fs::create_dir_all(blocked.join("inner")).unwrap();
    let broken = ctx.dev.map.get_mut("b.svg").unwrap();
    *broken = ContentRef {
        file: blocked.clone(),
        ..broken.clone()
    };

    let flags = RunFlags {
        sync_removed_in_dev: true,
        ..dev_flags()
    };
    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    let report = Reconciler::new(flags, &mut stager, &reporter)
        .sync_dev_repo(&mut ctx)
        .expect("enabled");

    let removed: Vec<_> = ctx.by_designers.removed.iter().cloned().collect();
    assert_eq!(removed, vec!["b.svg".to_string()]);
    assert_eq!(stager.staged_paths(), vec!["a.svg", "c.svg"]);
    assert!(!report.aborted());
    assert!(reporter
        .events()
        .iter()
        .any(|e| matches!(e, SyncEvent::DeleteFailed { .. })));
}

#[test]
fn contract_violation_aborts_only_its_batch() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "a.svg", b"a");
    write(design.path(), "m.svg", b"m2");
    write(dev.path(), "m.svg", b"m1");
    let mut ctx = context(design.path(), dev.path());
    ctx.by_designers.added.insert("0-ghost.svg".to_string());

    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    let report = Reconciler::new(dev_flags(), &mut stager, &reporter)
        .sync_dev_repo(&mut ctx)
        .expect("enabled");

    assert!(report.passes[0].aborted.is_some());
    assert!(report.passes[1].aborted.is_none());
    assert!(ctx.by_designers.added.contains("0-ghost.svg"));
    assert!(ctx.by_designers.added.contains("a.svg"), "unvisited entry stays pending");
    assert!(ctx.by_designers.modified.is_empty());
    assert_eq!(stager.staged_paths(), vec!["m.svg"]);
}

#[test]
fn occupied_destination_does_not_stop_other_additions() {
    let design = TempDir::new().unwrap();
    let dev = TempDir::new().unwrap();
    write(design.path(), "a.svg", b"a");
    write(design.path(), "b.svg", b"b");
    write(design.path(), "c.svg", b"c");
    write(dev.path(), "b.svg/notes.txt", b"not an icon");
    let mut ctx = context(design.path(), dev.path());
    assert_eq!(ctx.by_designers.added.len(), 3);

    let mut stager = RecordingStager::new();
    let reporter = RecordingReporter::new();
    let report = Reconciler::new(dev_flags(), &mut stager, &reporter)
        .sync_dev_repo(&mut ctx)
        .expect("enabled");

    assert!(!report.aborted());
    assert_eq!(report.passes[0].retried, 1);
    let pending: Vec<_> = ctx.by_designers.added.iter().cloned().collect();
    assert_eq!(pending, vec!["b.svg".to_string()]);
    assert_eq!(stager.staged_paths(), vec!["a.svg", "c.svg"]);
    assert!(reporter
        .events()
        .contains(&SyncEvent::NotAFile { file: dev.path().join("b.svg") }));
}
