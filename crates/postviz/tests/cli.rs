use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../postvizapp/tests/fixtures/session.json")
}

fn postviz(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("postviz").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("POSTVIZ_SESSION")
        .env_remove("POSTVIZ_READ_POLICY")
        .env_remove("POSTVIZ_OUTLINE_MESH_NAME")
        .arg("--session")
        .arg(fixture())
        .arg("--state")
        .arg(dir.path().join("state.json"));
    cmd
}

#[test]
fn state_persists_between_invocations() {
    let dir = TempDir::new().unwrap();
    postviz(&dir)
        .args(["create", "Contours", "--name", "c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created Contours/c"));

    postviz(&dir)
        .args(["set", "Graphics/Contours/c/field", "temperature"])
        .assert()
        .success();

    postviz(&dir)
        .args(["get", "Graphics/Contours/c/field"])
        .assert()
        .success()
        .stdout("temperature\n");
}

#[test]
fn validation_errors_exit_with_failure() {
    let dir = TempDir::new().unwrap();
    postviz(&dir)
        .args(["delete", "Meshes", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: 'names' has no value"));
}

#[test]
fn attributes_print_as_json() {
    let dir = TempDir::new().unwrap();
    postviz(&dir)
        .args(["create", "Contours", "--name", "c"])
        .assert()
        .success();
    postviz(&dir)
        .args(["attr", "Graphics/Contours/c/range/option", "allowed_values"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auto-range-off"));
}

#[test]
fn outline_name_comes_from_local_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("postviz.toml"), "outline_mesh_name = \"hull\"\n").unwrap();
    postviz(&dir)
        .arg("outline")
        .assert()
        .success()
        .stdout(predicate::str::contains("Meshes/hull"));
}

#[test]
fn schema_needs_no_session() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("postviz")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("POSTVIZ_SESSION")
        .args(["schema", "Plots"])
        .assert()
        .success()
        .stdout(predicate::str::contains("monitor_set_name"));
}

#[test]
fn missing_session_is_reported() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("postviz")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("POSTVIZ_SESSION")
        .args(["show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No session snapshot given"));
}
