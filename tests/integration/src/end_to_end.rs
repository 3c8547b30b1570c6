//! End-to-end tests across the workspace
//!
//! Each test publishes an on-disk fixture source as a real git repository,
//! downloads it through `Git2Transport` and drives the installer against a
//! sandboxed home and project.

use std::fs;
use std::path::{Path, PathBuf};

use kit_core::{
    ArtifactStatus, ConflictStrategy, Context, Error, InstallRequest, Installer, InstallationTracker,
};
use kit_fs::{Algorithm, checksum};
use kit_git::Git2Transport;
use kit_manifest::Manifest;
use kit_test_utils::{Sandbox, SourceRepo};
use kit_tools::{Scope, Tool};
use pretty_assertions::assert_eq;

const TRANSPORT: Git2Transport = Git2Transport;

fn fixture_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/sources")
        .join(name)
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<(String, String)>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else {
            let relative = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
            out.push((relative, fs::read_to_string(&path).unwrap()));
        }
    }
}

/// Publish a fixture source as a committed git repository.
fn publish(name: &str) -> SourceRepo {
    let root = fixture_dir(name);
    let mut files = Vec::new();
    collect_files(&root, &root, &mut files);
    let borrowed: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
    SourceRepo::with_files(&borrowed)
}

fn context(sandbox: &Sandbox) -> Context {
    Context::new(sandbox.home(), sandbox.kit_home(), sandbox.project(), Some(sandbox.project())).unwrap()
}

#[test]
fn layered_fixture_validates_cleanly() {
    let manifest = Manifest::load_from_dir(&fixture_dir("layered")).unwrap();
    assert!(manifest.validate().is_empty());
    assert!(manifest.size_warnings().is_empty());
    assert_eq!(manifest.version, "2.0");
}

#[test]
fn dependent_templates_install_in_either_order() {
    for order in [["ext", "base"], ["base", "ext"]] {
        let sandbox = Sandbox::new();
        let source = publish("layered");
        let ctx = context(&sandbox);
        let installer = Installer::new(&ctx, &TRANSPORT);
        let namespace = installer
            .download(&source.url(), None, Some("layered"), false)
            .unwrap()
            .repository()
            .namespace
            .clone();

        for template in order {
            let request = InstallRequest::new(namespace.clone(), vec![Tool::Claude], Scope::Project)
                .with_templates(vec![template.to_string()]);
            let report = installer.install(&request).unwrap();
            assert_eq!(report.written(), 1, "installing {template} after {order:?}");
        }

        sandbox.assert_project_file_contains(".claude/rules/base.md", "Keep functions short.");
        sandbox.assert_project_file_contains(".claude/rules/ext.md", "doc comment");
        assert_eq!(installer.tracker().list(Some(Scope::Project)).unwrap().len(), 2);
    }
}

#[test]
fn global_and_project_installs_are_tracked_separately() {
    let sandbox = Sandbox::new();
    let source = publish("layered");
    let ctx = context(&sandbox);
    let installer = Installer::new(&ctx, &TRANSPORT);
    installer
        .download(&source.url(), None, Some("layered"), false)
        .unwrap();

    let global = InstallRequest::new("layered", vec![Tool::Claude], Scope::Global).with_bundle("all-rules");
    let project = InstallRequest::new("layered", vec![Tool::Copilot, Tool::Cursor], Scope::Project);
    installer.install(&global).unwrap();
    let report = installer.install(&project).unwrap();

    // Copilot takes its own pre-formatted file; Cursor has no hook support.
    let copilot_base = sandbox.project().join(".github/instructions/base.instructions.md");
    let content = fs::read_to_string(&copilot_base).unwrap();
    assert!(content.starts_with("---\napplyTo: \"**/*.rs\"\n---"), "got: {content}");
    let hook = report
        .artifacts
        .iter()
        .find(|a| a.name == "format-check" && a.tool == Tool::Cursor)
        .unwrap();
    assert_eq!(hook.status, ArtifactStatus::Skipped);

    assert!(sandbox.home().join(".claude/rules/base.md").is_file());
    assert!(sandbox.home().join(".claude/rules/ext.md").is_file());

    let tracker = InstallationTracker::new(&ctx);
    let global_records = tracker.list(Some(Scope::Global)).unwrap();
    let project_records = tracker.list(Some(Scope::Project)).unwrap();
    assert_eq!(global_records.len(), 2);
    assert!(global_records.iter().all(|r| r.bundle_name.as_deref() == Some("all-rules")));
    assert_eq!(project_records.len(), 4);
    assert_eq!(tracker.list(None).unwrap().len(), 6);

    let stored = fs::read_to_string(sandbox.project().join(".instructionkit/installations.json")).unwrap();
    assert!(!stored.contains(&*sandbox.project().to_string_lossy()));
}

#[test]
fn recorded_checksums_match_installed_files() {
    let sandbox = Sandbox::new();
    let source = publish("layered");
    let ctx = context(&sandbox);
    let installer = Installer::new(&ctx, &TRANSPORT);
    installer
        .download(&source.url(), None, Some("layered"), false)
        .unwrap();

    let request = InstallRequest::new("layered", vec![Tool::Claude, Tool::Cursor], Scope::Project);
    installer.install(&request).unwrap();

    let records = installer.tracker().list(Some(Scope::Project)).unwrap();
    assert!(!records.is_empty());
    for record in records {
        let actual = checksum::calculate_file(&record.installed_path, Algorithm::Sha256).unwrap();
        assert_eq!(actual, record.checksum, "{}", record.installed_path.display());
        checksum::verify_file(&record.installed_path, &record.checksum, Algorithm::Sha256).unwrap();
    }

    let hook = sandbox.project().join(".claude/hooks/format-check.sh");
    fs::write(&hook, "#!/bin/sh\nexit 0\n").unwrap();
    let record = installer
        .tracker()
        .find("format-check", Tool::Claude, Scope::Project)
        .unwrap()
        .unwrap();
    assert!(checksum::verify_file(&hook, &record.checksum, Algorithm::Sha256).is_err());
}

#[test]
fn overwrite_twice_leaves_one_record_from_the_second_install() {
    let sandbox = Sandbox::new();
    let source = publish("layered");
    let ctx = context(&sandbox);
    let installer = Installer::new(&ctx, &TRANSPORT);
    installer
        .download(&source.url(), None, Some("layered"), false)
        .unwrap();
    let request = InstallRequest::new("layered", vec![Tool::Claude], Scope::Project)
        .with_templates(vec!["base".into()])
        .with_strategy(ConflictStrategy::Overwrite);

    installer.install(&request).unwrap();
    let first = installer.tracker().find("base", Tool::Claude, Scope::Project).unwrap().unwrap();
    installer.install(&request).unwrap();
    let records = installer.tracker().list(Some(Scope::Project)).unwrap();

    assert_eq!(records.len(), 1);
    assert_ne!(records[0].id, first.id);
    assert!(records[0].installed_at >= first.installed_at);
}

#[test]
fn cyclic_source_is_rejected_before_anything_is_installed() {
    let sandbox = Sandbox::new();
    let source = SourceRepo::with_files(&[
        (
            "instructionkit.yaml",
            "name: cyclic\ndescription: x\nversion: 1.0.0\ntemplates:\n  - name: a\n    files: [a.md]\n    dependencies: [b]\n  - name: b\n    files: [b.md]\n    dependencies: [a]\n",
        ),
        ("a.md", "# a\n"),
        ("b.md", "# b\n"),
    ]);
    let ctx = context(&sandbox);
    let installer = Installer::new(&ctx, &TRANSPORT);

    let error = installer
        .download(&source.url(), None, Some("cyclic"), false)
        .unwrap_err();
    assert!(matches!(error, Error::Manifest(_)));
    assert!(error.to_string().contains("dependency cycle: a -> b -> a"), "got: {error}");
    assert!(installer.library().list().unwrap().is_empty());
}
