use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use refdoc_test_support::{write_file, write_fixture_snapshot};
use tempfile::TempDir;

fn refdoc(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("refdoc").expect("binary");
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn project() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    write_fixture_snapshot(temp.path());
    write_file(temp.path(), "intro.md", "# Test Package\n\nGenerated API docs.\n");
    write_file(
        temp.path(),
        ".refdoc.toml",
        r#"
[render]
toc_header = "Contents"

[[document]]
markdown = "intro.md"

[[document]]
toc = true

[[document]]
rule = true

[[document]]
entity = "test.test_module"
expand = true
"#,
    );
    temp
}

#[test]
fn render_writes_configured_plan() {
    let temp = project();

    refdoc(temp.path())
        .args(["render", "--snapshot", "snapshot.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    let readme = fs::read_to_string(temp.path().join("README.md")).expect("read output");
    assert!(readme.starts_with("# Test Package\n\nGenerated API docs.\n\n# Contents\n\n"));
    assert!(readme.contains("* `test.test_module`\n    * `Class(x: float)`\n"));
    assert!(readme.contains("\n---\n\n# `test.test_module`\n\nThis is a test module!\n"));
    assert!(readme.contains("### `__init__(self, x: float)`\n\nThis is a test init!\n"));
    assert!(!readme.contains("_helper"));
    assert!(!readme.contains("Enum"));
}

#[test]
fn stdout_mode_prints_selected_entities_without_writing() {
    let temp = project();

    refdoc(temp.path())
        .args([
            "render",
            "--snapshot",
            "snapshot.json",
            "--stdout",
            "--entity",
            "test.test_module.function",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "## `function(x: int, y: str)`\n\nThis is a test function!\n",
        ))
        .stdout(predicate::str::contains("Contents").not());

    assert!(!temp.path().join("README.md").exists());
}

#[test]
fn check_mode_reports_stale_output() {
    let temp = project();
    write_file(temp.path(), "README.md", "stale\n");

    refdoc(temp.path())
        .args(["render", "--snapshot", "snapshot.json", "--check"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("-stale"))
        .stderr(predicate::str::contains("is out of date"));

    assert_eq!(
        fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "stale\n"
    );

    refdoc(temp.path())
        .args(["render", "--snapshot", "snapshot.json"])
        .assert()
        .success();
    refdoc(temp.path())
        .args(["render", "--snapshot", "snapshot.json", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn flat_flag_lifts_method_headings() {
    let temp = project();

    refdoc(temp.path())
        .args([
            "render",
            "--snapshot",
            "snapshot.json",
            "--stdout",
            "--flat",
            "--expand-all",
            "--entity",
            "test.test_module.Class",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("## `method(self, y: float)`"))
        .stdout(predicate::str::contains("###").not());
}

#[test]
fn override_config_and_output_flags() {
    let temp = project();
    write_file(
        temp.path(),
        "api.toml",
        r#"
[render]
heading_scheme = "flat"

[[document]]
entity = "test.test_module.sub_module_file"
"#,
    );

    refdoc(temp.path())
        .args([
            "render",
            "--snapshot",
            "snapshot.json",
            "--config",
            "api.toml",
            "--output",
            "docs/API.md",
        ])
        .assert()
        .success();

    let api = fs::read_to_string(temp.path().join("docs/API.md")).expect("read output");
    assert_eq!(
        api,
        "# `test.test_module.sub_module_file`\n\nThis is a test sub-module in a file!\n\n"
    );
}

#[test]
fn unknown_entity_fails() {
    let temp = project();

    refdoc(temp.path())
        .args([
            "render",
            "--snapshot",
            "snapshot.json",
            "--entity",
            "test.test_module.nope",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "unknown entity path 'test.test_module.nope'",
        ));
}

#[test]
fn empty_plan_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    write_fixture_snapshot(temp.path());

    refdoc(temp.path())
        .args(["render", "--snapshot", "snapshot.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to document"));
    assert!(!temp.path().join("README.md").exists());
}

#[test]
fn missing_snapshot_fails_with_context() {
    let temp = project();

    refdoc(temp.path())
        .args(["list", "--snapshot", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading snapshot absent.json"));
}

#[test]
fn list_prints_paths_and_kinds() {
    let temp = project();

    refdoc(temp.path())
        .args(["list", "--snapshot", "snapshot.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test.test_module\tmodule\n"))
        .stdout(predicate::str::contains("test.test_module.Class.__init__\tfunction\n"))
        .stdout(predicate::str::contains(
            "test.test_module.Class.classmethod\tclass_method\n",
        ))
        .stdout(predicate::str::contains("test.test_module.Enum.").not());
}

#[test]
fn list_json_is_machine_readable() {
    let temp = project();

    let output = refdoc(temp.path())
        .args(["list", "--snapshot", "snapshot.json", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout is json");
    let entities = payload["entities"].as_array().expect("entities array");
    assert!(entities.iter().any(|entity| {
        entity["path"] == "test.test_module.function" && entity["kind"] == "function"
    }));
}
