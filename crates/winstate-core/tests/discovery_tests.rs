//! Discovery engine over fake PATH, registry and driver sources

mod common;

use common::{FakeCommands, FakeDriver, FakeUninstall, context};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use winstate_core::discovery::{DiscoveryEntry, DiscoveryMethod, sort_entries};
use winstate_core::{DiscoveryEngine, render_template};
use winstate_test_utils::TestProfiles;

fn commands() -> FakeCommands {
    FakeCommands::default()
        .with("git", "C:/Program Files/Git/cmd/git.exe", Some("\ngit version 2.43.0.windows.1\n"))
        .with("node", "C:/Program Files/nodejs/node.exe", Some("v20.11.0"))
        .with("go", "C:/Go/bin/go.exe", None)
}

fn uninstall() -> FakeUninstall {
    FakeUninstall::default()
        .with("Git", "2.43.0")
        .with("Git", "2.43.0")
        .with("Python 3.12.1 (64-bit)", "3.12.1150.0")
        .with("Contoso Widget", "1.0")
        .with("Docker Desktop", "4.27.1")
}

#[test]
fn path_versions_use_first_non_empty_line() {
    let fx = TestProfiles::new();
    let commands = commands();
    let uninstall = FakeUninstall::default();
    let mut ctx = context(&fx.state_dir());

    let report = DiscoveryEngine::new(&commands, &uninstall).run(&mut ctx).unwrap();

    let versions: Vec<(&str, &str)> = report
        .entries
        .iter()
        .map(|e| (e.name.as_str(), e.version.as_deref().unwrap_or("?")))
        .collect();
    assert_eq!(
        versions,
        vec![
            ("git", "git version 2.43.0.windows.1"),
            ("go", ""),
            ("node", "v20.11.0"),
        ]
    );
}

#[test]
fn registry_entries_are_deduplicated_and_unknown_families_dropped() {
    let fx = TestProfiles::new();
    let commands = FakeCommands::default();
    let uninstall = uninstall();
    let mut ctx = context(&fx.state_dir());

    let report = DiscoveryEngine::new(&commands, &uninstall).run(&mut ctx).unwrap();

    let found: Vec<(&str, Option<&str>)> = report
        .entries
        .iter()
        .map(|e| (e.name.as_str(), e.suggested_driver_id.as_deref()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("docker", Some("Docker.DockerDesktop")),
            ("git", Some("Git.Git")),
            ("python", Some("Python.Python.3.12")),
        ]
    );
}

#[test]
fn ownership_is_marked_from_driver_ids() {
    let fx = TestProfiles::new();
    let commands = commands();
    let uninstall = uninstall();
    let driver = FakeDriver::with_ids(&["Git.Git", "Python.Python.3"]);
    let mut ctx = context(&fx.state_dir());

    let report = DiscoveryEngine::new(&commands, &uninstall)
        .with_driver(&driver)
        .run(&mut ctx)
        .unwrap();

    let owned: Vec<(&str, DiscoveryMethod)> = report
        .entries
        .iter()
        .filter(|e| e.owned_by_driver)
        .map(|e| (e.name.as_str(), e.method))
        .collect();
    assert_eq!(
        owned,
        vec![
            ("git", DiscoveryMethod::Path),
            ("git", DiscoveryMethod::Registry),
            ("python", DiscoveryMethod::Registry),
        ]
    );
    assert_eq!(report.summary.owned, 3);
    assert_eq!(report.summary.unowned, report.summary.total - 3);
}

#[test]
fn output_is_identical_across_runs() {
    let fx = TestProfiles::new();
    let commands = commands();
    let uninstall = uninstall();
    let driver = FakeDriver::with_ids(&["Git.Git"]);

    let mut first_ctx = context(&fx.state_dir());
    let first = DiscoveryEngine::new(&commands, &uninstall)
        .with_driver(&driver)
        .run(&mut first_ctx)
        .unwrap();
    let mut second_ctx = context(&fx.state_dir());
    let second = DiscoveryEngine::new(&commands, &uninstall)
        .with_driver(&driver)
        .run(&mut second_ctx)
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first.entries).unwrap(),
        serde_json::to_string(&second.entries).unwrap()
    );
    assert_eq!(
        render_template(&first.entries, "windows"),
        render_template(&second.entries, "windows")
    );
    assert_ne!(first.state_file, second.state_file);
}

#[test]
fn failing_sources_only_narrow_the_result() {
    let fx = TestProfiles::new();
    let commands = commands();
    let uninstall = FakeUninstall {
        fail: true,
        ..Default::default()
    };
    let driver = FakeDriver::failing();
    let mut ctx = context(&fx.state_dir());

    let report = DiscoveryEngine::new(&commands, &uninstall)
        .with_driver(&driver)
        .run(&mut ctx)
        .unwrap();

    assert_eq!(report.summary.path, 3);
    assert_eq!(report.summary.registry, 0);
    assert_eq!(report.warnings.len(), 2);
    assert!(report.entries.iter().all(|e| !e.owned_by_driver));
}

#[test]
fn template_lists_unowned_discoveries_once() {
    let fx = TestProfiles::new();
    let commands = commands();
    let uninstall = uninstall();
    let driver = FakeDriver::with_ids(&["Git.Git"]);
    let mut ctx = context(&fx.state_dir());

    let report = DiscoveryEngine::new(&commands, &uninstall)
        .with_driver(&driver)
        .run(&mut ctx)
        .unwrap();
    let template = render_template(&report.entries, "windows");

    assert!(!template.contains("\"Git.Git\""));
    assert!(template.contains("\"OpenJS.NodeJS\""));
    assert!(template.contains("\"Python.Python.3.12\""));
    assert_eq!(template.matches("// docker (").count(), 1);
}

fn method_strategy() -> impl Strategy<Value = DiscoveryMethod> {
    prop_oneof![Just(DiscoveryMethod::Path), Just(DiscoveryMethod::Registry)]
}

proptest! {
    #[test]
    fn sorting_is_order_independent(
        raw in proptest::collection::vec(("[a-cA-C]{1,2}", method_strategy(), proptest::option::of("[a-c/]{0,3}")), 0..12)
    ) {
        let entries: Vec<DiscoveryEntry> = raw
            .into_iter()
            .map(|(name, method, path)| {
                let mut entry = DiscoveryEntry::new(name, method);
                entry.path = path;
                entry
            })
            .collect();

        let mut forward = entries.clone();
        let mut backward: Vec<DiscoveryEntry> = entries.into_iter().rev().collect();
        sort_entries(&mut forward);
        sort_entries(&mut backward);

        let key = |e: &DiscoveryEntry| (e.name.clone(), e.method, e.path.clone().unwrap_or_default());
        let forward_keys: Vec<_> = forward.iter().map(key).collect();
        let backward_keys: Vec<_> = backward.iter().map(key).collect();
        prop_assert_eq!(&forward_keys, &backward_keys);
        prop_assert!(forward_keys.windows(2).all(|w| w[0] <= w[1]));
    }
}
