//! CLI integration tests for the `pai` binary.
//!
//! Each test points `PAI_BASE_PATH` at a private temp directory so engine
//! instances never share state.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the pai binary rooted in a temp base dir.
fn pai(base: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pai").unwrap();
    cmd.env("PAI_BASE_PATH", base.path());
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let base = TempDir::new().unwrap();
    pai(&base)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("action"))
        .stdout(predicate::str::contains("pipeline"));
}

#[test]
fn test_version_displays() {
    let base = TempDir::new().unwrap();
    pai(&base)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pai"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_action_list_empty_roots() {
    let base = TempDir::new().unwrap();
    pai(&base)
        .args(["action", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"actions\": []"));
}

#[test]
fn test_action_list_finds_packages() {
    let base = TempDir::new().unwrap();
    let dir = base.path().join("actions").join("A_GREET");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("action.json"),
        r#"{ "name": "A_GREET", "version": "1.0.0", "description": "greet" }"#,
    )
    .unwrap();

    pai(&base)
        .args(["action", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A_GREET"));
}

#[test]
fn test_pipeline_list_empty_roots() {
    let base = TempDir::new().unwrap();
    pai(&base)
        .args(["pipeline", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pipelines\": []"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Running
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_run_missing_action_exits_nonzero() {
    let base = TempDir::new().unwrap();
    pai(&base)
        .args(["action", "run", "A_MISSING", "--input", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Action not found: A_MISSING"));
}

#[test]
fn test_run_builtin_write_file() {
    let base = TempDir::new().unwrap();
    let out = base.path().join("note.txt");

    pai(&base)
        .args([
            "action",
            "run",
            "_builtin/write-file",
            "--path",
            out.to_str().unwrap(),
            "--content",
            "written by the cli",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));

    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "written by the cli"
    );
}

#[test]
fn test_run_builtin_missing_input_fails_validation() {
    let base = TempDir::new().unwrap();
    pai(&base)
        .args(["action", "run", "_builtin/write-file", "--input", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input validation failed"));
}

#[test]
fn test_run_reads_stdin_json() {
    let base = TempDir::new().unwrap();
    let out = base.path().join("from-stdin.txt");

    pai(&base)
        .args(["action", "run", "_builtin/write-file"])
        .write_stdin(format!(
            r#"{{"path": "{}", "content": "stdin input"}}"#,
            out.display()
        ))
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "stdin input");
}

#[test]
fn test_run_missing_pipeline_exits_nonzero() {
    let base = TempDir::new().unwrap();
    pai(&base)
        .args(["pipeline", "run", "ghost", "--input", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pipeline not found: ghost"));
}

#[test]
fn test_run_pipeline_with_builtin_step() {
    let base = TempDir::new().unwrap();
    let pipelines = base.path().join("pipelines");
    std::fs::create_dir_all(&pipelines).unwrap();
    let out = base.path().join("pipeline-out.txt");

    std::fs::write(
        pipelines.join("save.toml"),
        r#"
[pipeline]
name = "save"

[[pipeline.steps]]
id = "write"
action = "_builtin/write-file"
input = { path = "{{input.path}}", content = "{{input.content}}" }

[pipeline.output]
path = "{{steps.write.output.path}}"
"#,
    )
    .unwrap();

    pai(&base)
        .args([
            "pipeline",
            "run",
            "save",
            "--path",
            out.to_str().unwrap(),
            "--content",
            "via pipeline",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "via pipeline");
}

#[test]
fn test_invalid_input_flag_rejected() {
    let base = TempDir::new().unwrap();
    pai(&base)
        .args(["action", "run", "A_X", "--input", "not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input is not valid JSON"));
}
