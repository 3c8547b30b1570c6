//! End-to-end tests that invoke the compiled `kit` binary against a sandboxed
//! home directory and a local source repository.

use assert_cmd::Command;
use kit_test_utils::fixtures::standards_files;
use kit_test_utils::{Sandbox, SourceRepo};
use predicates::prelude::*;

/// `kit` running in the sandbox project with home and kit home redirected.
fn kit(sandbox: &Sandbox) -> Command {
    let mut cmd = Command::cargo_bin("kit").unwrap();
    cmd.current_dir(sandbox.project())
        .env("HOME", sandbox.home())
        .env("INSTRUCTIONKIT_HOME", sandbox.kit_home())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn download(sandbox: &Sandbox, source: &SourceRepo) {
    kit(sandbox)
        .args(["download", &source.url(), "--as", "standards"])
        .assert()
        .success();
}

#[test]
fn help_lists_commands() {
    let sandbox = Sandbox::new();
    kit(&sandbox)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"));
}

#[test]
fn version_flag() {
    let sandbox = Sandbox::new();
    kit(&sandbox)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kit"));
}

#[test]
fn validate_reports_every_issue() {
    let sandbox = Sandbox::new();
    sandbox.write_project_file(
        "source/instructionkit.yaml",
        "name: broken\ndescription: x\nversion: 1.0.0\ntemplates:\n  - name: a\n    files: [a.md]\n    dependencies: [ghost]\n",
    );

    kit(&sandbox)
        .args(["validate", "source"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("a.md"))
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn validate_accepts_a_good_source() {
    let sandbox = Sandbox::new();
    for (path, content) in standards_files() {
        sandbox.write_project_file(&format!("source/{path}"), content);
    }

    kit(&sandbox)
        .args(["validate", "source/instructionkit.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid: 3 templates, 1 bundles, 1 MCP servers"));
}

#[test]
fn download_then_list_library_as_json() {
    let sandbox = Sandbox::new();
    let source = SourceRepo::with_files(&standards_files());
    download(&sandbox, &source);

    let output = kit(&sandbox).args(["library", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["namespace"], "standards");
    assert_eq!(json[0]["version"], "1.2.0");

    kit(&sandbox)
        .args(["download", &source.url(), "--as", "standards"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in the library"));
}

#[test]
fn install_list_and_uninstall() {
    let sandbox = Sandbox::new();
    let source = SourceRepo::with_files(&standards_files());
    download(&sandbox, &source);

    kit(&sandbox)
        .args(["install", "standards", "python", "--tool", "claude", "--tool", "cursor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 written"));
    assert!(sandbox.project().join(".claude/rules/python.md").is_file());
    assert!(sandbox.project().join(".cursor/rules/python.mdc").is_file());

    let output = kit(&sandbox).args(["installed", "--json"]).output().unwrap();
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.as_array().map(Vec::len), Some(2));

    kit(&sandbox)
        .args(["uninstall", "python", "--tool", "cursor"])
        .assert()
        .success();
    assert!(!sandbox.project().join(".cursor/rules/python.mdc").exists());
    assert!(sandbox.project().join(".claude/rules/python.md").is_file());

    kit(&sandbox)
        .args(["uninstall", "python", "--tool", "cursor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn second_install_skips_existing_files_unless_told_otherwise() {
    let sandbox = Sandbox::new();
    let source = SourceRepo::with_files(&standards_files());
    download(&sandbox, &source);
    let args = ["install", "standards", "testing", "--tool", "claude"];

    kit(&sandbox).args(args).assert().success();
    kit(&sandbox)
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    kit(&sandbox)
        .args(args)
        .args(["--conflict", "rename"])
        .assert()
        .success();
    assert!(sandbox.project().join(".claude/rules/testing-1.md").is_file());
}

#[test]
fn project_install_outside_a_project_fails() {
    let sandbox = Sandbox::new();
    let source = SourceRepo::with_files(&standards_files());
    download(&sandbox, &source);

    kit(&sandbox)
        .current_dir(sandbox.root())
        .args(["install", "standards", "--tool", "claude"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("project root"));
}

#[test]
fn unknown_tool_is_a_usage_error() {
    let sandbox = Sandbox::new();
    kit(&sandbox)
        .args(["install", "standards", "--tool", "emacs"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn mcp_credentials_flow() {
    let sandbox = Sandbox::new();
    let source = SourceRepo::with_files(&standards_files());
    download(&sandbox, &source);

    kit(&sandbox)
        .args(["env", "check", "standards", "github"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("GITHUB_TOKEN"));

    kit(&sandbox)
        .args(["env", "set", "GITHUB_TOKEN", "ghp_0123456789"])
        .assert()
        .success();
    kit(&sandbox)
        .args(["env", "check", "standards", "github"])
        .assert()
        .success();
    kit(&sandbox)
        .args(["env", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ghp_****"))
        .stdout(predicate::str::contains("0123456789").not());

    kit(&sandbox)
        .args(["install", "standards", "testing", "--tool", "claude", "--mcp", "github"])
        .assert()
        .success();
    let config = std::fs::read_to_string(sandbox.project().join(".mcp.json")).unwrap();
    assert!(config.contains("ghp_0123456789"));

    let gitignore = std::fs::read_to_string(sandbox.project().join(".gitignore")).unwrap();
    assert!(gitignore.contains(".instructionkit/.env"));
}

#[test]
fn update_reports_up_to_date() {
    let sandbox = Sandbox::new();
    let source = SourceRepo::with_files(&standards_files());
    download(&sandbox, &source);

    kit(&sandbox)
        .args(["update", "standards"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));

    kit(&sandbox)
        .args(["update", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}
