// ABOUTME: Integration tests for the skiff CLI commands.
// ABOUTME: Validates --help output and config-init behavior.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn skiff_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("skiff"));
    cmd.env_remove("SKIFF_CONFIG");
    cmd
}

#[test]
fn help_shows_commands() {
    skiff_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("rollback"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("logs"))
        .stdout(predicate::str::contains("config-init"));
}

#[test]
fn config_init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("skiff.yml");

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["config-init", "--host", "web1.example.com"])
        .assert()
        .success();

    assert!(config_path.exists(), "skiff.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("host: web1.example.com"));
}

#[test]
fn config_init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("skiff.yml");

    fs::write(&config_path, "existing: config").unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .arg("config-init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn push_without_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["push", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn invalid_project_name_is_rejected_before_connecting() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("skiff.yml"),
        "ssh: deploy@unreachable.invalid\n",
    )
    .unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["status", "../etc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid project name"));
}

#[test]
fn json_mode_reports_errors_as_events() {
    let temp_dir = tempfile::tempdir().unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "rollback", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""event":"error""#));
}
