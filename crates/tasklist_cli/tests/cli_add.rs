use std::path::Path;
use std::process::{Command, Output};

fn run(store_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .args(args)
        .env("TASKLIST_STORE_DIR", store_dir)
        .env("TASKLIST_CONFIG_PATH", store_dir.join("config.json"))
        .output()
        .expect("failed to run tasklist")
}

fn stored_tasks(store_dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(store_dir.join("tasks.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn add_command_appends_and_persists() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "Buy milk"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Buy milk"));

    run(dir.path(), &["add", "Call mom"]);

    let stored = stored_tasks(dir.path());
    assert_eq!(stored.as_array().unwrap().len(), 2);
    assert_eq!(stored[0]["title"], "Buy milk");
    assert_eq!(stored[0]["completed"], false);
    assert_eq!(stored[1]["title"], "Call mom");
}

#[test]
fn add_command_json_reports_task() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "Buy milk", "--json"]);
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stored = stored_tasks(dir.path());
    assert_eq!(payload["title"], "Buy milk");
    assert_eq!(payload["id"], stored[0]["id"]);
}

#[test]
fn add_command_rejects_missing_title() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - title is required"));
}

#[test]
fn add_command_recovers_from_corrupt_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tasks.json"), "{ not json").unwrap();

    let output = run(dir.path(), &["add", "Buy milk"]);

    assert!(output.status.success());
    let stored = stored_tasks(dir.path());
    assert_eq!(stored.as_array().unwrap().len(), 1);
}

#[test]
fn add_command_keeps_title_verbatim() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["add", "  Buy milk  "]);

    assert!(output.status.success());
    assert_eq!(stored_tasks(dir.path())[0]["title"], "  Buy milk  ");
}

#[test]
fn add_command_uses_store_dir_override() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("override-store");
    let override_arg = format!("store_dir={}", store_dir.display());

    let output = Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .args(["add", "Buy milk", "--config-override", override_arg.as_str()])
        .env_remove("TASKLIST_STORE_DIR")
        .env("TASKLIST_CONFIG_PATH", dir.path().join("config.json"))
        .output()
        .expect("failed to run tasklist");

    assert!(output.status.success());
    let stored = stored_tasks(&store_dir);
    assert_eq!(stored[0]["title"], "Buy milk");
}
