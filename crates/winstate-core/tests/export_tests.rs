//! Export engine against a scratch system directory

mod common;

use common::context;
use pretty_assertions::assert_eq;
use serde_json::json;
use winstate_core::events::Event;
use winstate_core::export::SNAPSHOT_FILE;
use winstate_core::{
    EventEmitter, ExportEngine, ExportOptions, ExportStatus, ManifestResolver, MemorySink,
    ResolvedManifest, SensitivePathPolicy,
};
use winstate_test_utils::{TestProfiles, manifest};

fn dev_with_restore(fx: &TestProfiles, restore: serde_json::Value) -> ResolvedManifest {
    let mut dev = manifest("dev", &[], &[]);
    dev["restore"] = restore;
    let path = fx.write_bare("dev", &dev);
    ManifestResolver::new("windows").read_resolved(&path).unwrap()
}

fn engine() -> ExportEngine {
    ExportEngine::new(SensitivePathPolicy::with_defaults().unwrap())
}

fn options(fx: &TestProfiles, dry_run: bool) -> ExportOptions {
    ExportOptions {
        export_root: fx.root().join("export"),
        dry_run,
    }
}

#[test]
fn copies_files_and_directories_into_export_root() {
    let fx = TestProfiles::new();
    let gitconfig = fx.write_system_file("home/.gitconfig", "[user]\nname = me\n");
    fx.write_system_file("code/User/settings.json", "{}");
    fx.write_system_file("code/User/snippets/rust.json", "{}");

    let resolved = dev_with_restore(
        &fx,
        json!([
            {"source": "git/.gitconfig", "target": gitconfig.display().to_string()},
            {"source": "code/User", "target": fx.system_dir().join("code/User").display().to_string()}
        ]),
    );

    let mut ctx = context(&fx.state_dir());
    let report = engine().run(&mut ctx, &resolved, &options(&fx, false)).unwrap();

    assert_eq!(report.summary.exported, 2);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(fx.read("export/git/.gitconfig"), "[user]\nname = me\n");
    fx.assert_file_exists("export/code/User/snippets/rust.json");
    fx.assert_file_exists(&format!("export/{}", SNAPSHOT_FILE));
    assert_eq!(fx.read(&format!("export/{}", SNAPSHOT_FILE)), fx.read_bare("dev"));
}

#[test]
fn directory_export_replaces_stale_destination() {
    let fx = TestProfiles::new();
    fx.write_system_file("code/User/settings.json", "{\"fresh\": true}");
    std::fs::create_dir_all(fx.root().join("export/code")).unwrap();
    std::fs::write(fx.root().join("export/code/stale.json"), "old").unwrap();

    let resolved = dev_with_restore(
        &fx,
        json!([{"source": "code", "target": fx.system_dir().join("code/User").display().to_string()}]),
    );

    let mut ctx = context(&fx.state_dir());
    engine().run(&mut ctx, &resolved, &options(&fx, false)).unwrap();

    fx.assert_file_not_exists("export/code/stale.json");
    assert_eq!(fx.read("export/code/settings.json"), "{\"fresh\": true}");
}

#[test]
fn missing_target_is_skipped_not_failed() {
    let fx = TestProfiles::new();
    let resolved = dev_with_restore(
        &fx,
        json!([{"source": "x/config", "target": fx.system_dir().join("absent").display().to_string()}]),
    );

    let mut ctx = context(&fx.state_dir());
    let report = engine().run(&mut ctx, &resolved, &options(&fx, false)).unwrap();

    assert_eq!(report.results[0].status, ExportStatus::Skipped);
    assert_eq!(report.results[0].reason.as_deref(), Some("not found on system"));
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.failed, 0);
    assert!(report.success());
}

#[test]
fn copy_error_fails_the_item_and_later_entries_still_run() {
    let fx = TestProfiles::new();
    let first = fx.write_system_file("a.txt", "a");
    let second = fx.write_system_file("b.txt", "b");
    // A regular file where the destination directory must go
    std::fs::create_dir_all(fx.root().join("export")).unwrap();
    std::fs::write(fx.root().join("export/blocked"), "file").unwrap();

    let resolved = dev_with_restore(
        &fx,
        json!([
            {"source": "blocked/a.txt", "target": first.display().to_string()},
            {"source": "ok/b.txt", "target": second.display().to_string()}
        ]),
    );

    let mut ctx = context(&fx.state_dir());
    let report = engine().run(&mut ctx, &resolved, &options(&fx, false)).unwrap();

    assert_eq!(report.results[0].status, ExportStatus::Failed);
    assert!(report.results[0].message.is_some());
    assert_eq!(report.results[1].status, ExportStatus::Success);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.exported, 1);
    assert!(!report.success());
    assert_eq!(fx.read("export/ok/b.txt"), "b");
}

#[test]
fn source_outside_export_root_fails_without_touching_anything() {
    let fx = TestProfiles::new();
    fx.write_system_file("data/x.txt", "x");
    std::fs::create_dir_all(fx.root().join("export")).unwrap();
    std::fs::create_dir_all(fx.root().join("precious")).unwrap();
    std::fs::write(fx.root().join("precious/keep.txt"), "keep").unwrap();
    let absolute = fx.root().join("absolute");
    let data = fx.system_dir().join("data").display().to_string();

    let resolved = dev_with_restore(
        &fx,
        json!([
            {"source": "../precious", "target": data},
            {"source": absolute.display().to_string(), "target": data},
            {"source": "inside", "target": data}
        ]),
    );

    let mut ctx = context(&fx.state_dir());
    let report = engine().run(&mut ctx, &resolved, &options(&fx, false)).unwrap();

    for result in &report.results[..2] {
        assert_eq!(result.status, ExportStatus::Failed);
        assert_eq!(result.message.as_deref(), Some("source escapes export root"));
    }
    assert_eq!(report.results[2].status, ExportStatus::Success);
    assert_eq!(report.summary.failed, 2);
    assert_eq!(fx.read("precious/keep.txt"), "keep");
    fx.assert_file_not_exists("precious/x.txt");
    assert!(!absolute.exists());
    fx.assert_file_exists("export/inside/x.txt");
}

#[test]
fn dry_run_writes_nothing_and_counts_would_be_exports() {
    let fx = TestProfiles::new();
    let present = fx.write_system_file("home/.gitconfig", "x");
    let resolved = dev_with_restore(
        &fx,
        json!([
            {"source": "git/.gitconfig", "target": present.display().to_string()},
            {"source": "none", "target": fx.system_dir().join("absent").display().to_string()}
        ]),
    );

    let mut ctx = context(&fx.state_dir());
    let report = engine().run(&mut ctx, &resolved, &options(&fx, true)).unwrap();

    assert_eq!(report.results[0].status, ExportStatus::DryRun);
    assert_eq!(report.summary.exported, 1);
    assert_eq!(report.summary.skipped, 1);
    assert!(report.snapshot.is_none());
    fx.assert_file_not_exists("export");
}

#[test]
fn sensitive_paths_warn_but_still_export() {
    let fx = TestProfiles::new();
    let key = fx.write_system_file(".ssh/config", "Host *");
    let resolved = dev_with_restore(
        &fx,
        json!([{"source": "ssh/config", "target": key.display().to_string()}]),
    );

    let mut ctx = context(&fx.state_dir());
    let report = engine().run(&mut ctx, &resolved, &options(&fx, false)).unwrap();

    assert_eq!(report.results[0].status, ExportStatus::Success);
    assert!(!report.results[0].warnings.is_empty());
    assert_eq!(report.summary.warned, 1);
    assert_eq!(report.summary.exported, 1);
    assert!(report.success());
}

#[test]
fn placeholders_in_target_are_expanded() {
    let fx = TestProfiles::new();
    fx.write_system_file("appdata/tool/config.ini", "k=v");
    // SAFETY: tests in this binary do not read this variable concurrently
    unsafe { std::env::set_var("WINSTATE_EXPORT_TEST_ROOT", fx.system_dir()) };

    let resolved = dev_with_restore(
        &fx,
        json!([{"source": "tool/config.ini", "target": "%WINSTATE_EXPORT_TEST_ROOT%/appdata/tool/config.ini"}]),
    );

    let mut ctx = context(&fx.state_dir());
    let report = engine().run(&mut ctx, &resolved, &options(&fx, false)).unwrap();

    assert_eq!(report.results[0].status, ExportStatus::Success);
    assert_eq!(fx.read("export/tool/config.ini"), "k=v");
}

#[test]
fn events_report_items_artifact_and_summary() {
    let fx = TestProfiles::new();
    let file = fx.write_system_file("a.txt", "a");
    let resolved = dev_with_restore(
        &fx,
        json!([{"source": "a.txt", "target": file.display().to_string()}]),
    );

    let sink = MemorySink::new();
    let mut ctx = context(&fx.state_dir()).with_events(EventEmitter::with_writer(sink.clone()));
    engine().run(&mut ctx, &resolved, &options(&fx, false)).unwrap();

    let kinds: Vec<&str> = sink
        .records()
        .iter()
        .map(|r| match r.event {
            Event::Phase { .. } => "phase",
            Event::Item { .. } => "item",
            Event::Summary { .. } => "summary",
            Event::Artifact { .. } => "artifact",
            Event::Error { .. } => "error",
        })
        .collect();
    assert_eq!(kinds, vec!["phase", "item", "artifact", "summary"]);
}

#[test]
fn failed_state_write_still_closes_the_phase() {
    let fx = TestProfiles::new();
    let resolved = dev_with_restore(&fx, json!([]));
    let blocked = fx.root().join("state-blocked");
    std::fs::write(&blocked, "not a directory").unwrap();

    let sink = MemorySink::new();
    let mut ctx = context(&blocked).with_events(EventEmitter::with_writer(sink.clone()));
    let result = engine().run(&mut ctx, &resolved, &options(&fx, true));

    assert!(result.is_err());
    let last = sink.records().pop().map(|r| r.event);
    assert!(matches!(last, Some(Event::Summary { total: 0, .. })));
}

#[test]
fn default_export_root_sits_next_to_manifest() {
    let fx = TestProfiles::new();
    let resolved = dev_with_restore(&fx, json!([]));

    let root = ExportOptions::default_root(&resolved);
    assert_eq!(root, fx.profiles_dir().join("export"));
}
