use std::process::Command;
use tempfile::TempDir;

fn plenum_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_plenum"))
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_init_creates_plenum_directory() {
    let tmp = TempDir::new().unwrap();

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["init"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(tmp.path().join(".plenum").exists());
    assert!(tmp.path().join(".plenum/cache.db").exists());
    assert!(tmp.path().join(".plenum/outbox.db").exists());
    assert!(tmp.path().join(".plenum/config.yaml").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = TempDir::new().unwrap();

    plenum_cmd()
        .current_dir(tmp.path())
        .args(["init"])
        .output()
        .unwrap();

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["init"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Already initialized"));
}

#[test]
fn test_command_without_init_fails() {
    let tmp = TempDir::new().unwrap();

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "list"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not in a plenum workspace"));
}

fn init_with_series(tmp: &TempDir) -> String {
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["init"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["series", "add", "acme", "weekly", "--moderator=alice", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    parsed["_id"].as_str().unwrap().to_string()
}

fn minutes_id(tmp: &TempDir) -> String {
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    parsed[0]["_id"].as_str().unwrap().to_string()
}

#[test]
fn test_full_minutes_workflow() {
    let tmp = TempDir::new().unwrap();
    let series_id = init_with_series(&tmp);

    // Create minutes
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args([
            "minutes",
            "new",
            &format!("--series={}", series_id),
            "--date=2024-03-01",
            "--participants=alice, bob",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Created minutes"));

    let id = minutes_id(&tmp);

    // The series remembers its newest minutes
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["series", "list"])
        .output()
        .unwrap();
    assert!(stdout_of(&output).contains("last minutes 2024-03-01"));

    // Update a field
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "update", &id, "--date=2024-03-02"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "show", &id, "--json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(parsed["date"], "2024-03-02");
    assert_eq!(parsed["participants"], "alice, bob");
    assert_eq!(parsed["isUnfinalized"], true);
}

#[test]
fn test_topic_lifecycle() {
    let tmp = TempDir::new().unwrap();
    let series_id = init_with_series(&tmp);

    plenum_cmd()
        .current_dir(tmp.path())
        .args([
            "minutes",
            "new",
            &format!("--series={}", series_id),
            "--date=2024-03-01",
        ])
        .output()
        .unwrap();
    let id = minutes_id(&tmp);

    // Add a topic
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["topic", "add", &id, "Budget"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Added topic"));

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["topic", "list", &id, "--json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["isNew"], true);
    assert_eq!(parsed[0]["isOpen"], true);
    let topic_id = parsed[0]["_id"].as_str().unwrap().to_string();

    // A brand-new topic shows up in the new filter
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["topic", "list", &id, "--new"])
        .output()
        .unwrap();
    assert!(stdout_of(&output).contains("Budget"));

    // Close the discussion
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["topic", "edit", &id, &topic_id, "--close"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["topic", "list", &id, "--json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(parsed[0]["isOpen"], false);
    assert_eq!(parsed[0]["isNew"], true);

    // Still new, so the old-and-closed filter stays empty
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["topic", "list", &id, "--closed"])
        .output()
        .unwrap();
    assert!(stdout_of(&output).contains("No topics found"));

    // Remove it
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["topic", "remove", &id, &topic_id, "--force"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Removed topic"));

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["topic", "list", &id])
        .output()
        .unwrap();
    assert!(stdout_of(&output).contains("No topics found"));
}

#[test]
fn test_finalize_round_trip() {
    let tmp = TempDir::new().unwrap();
    let series_id = init_with_series(&tmp);

    plenum_cmd()
        .current_dir(tmp.path())
        .args([
            "minutes",
            "new",
            &format!("--series={}", series_id),
            "--date=2024-03-01",
        ])
        .output()
        .unwrap();
    let id = minutes_id(&tmp);

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "finalize", &id])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Finalized minutes"));

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "show", &id, "--json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(parsed["isFinalized"], true);
    assert_eq!(parsed["isUnfinalized"], false);

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "unfinalize", &id])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "show", &id, "--json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(parsed["isFinalized"], false);
    assert_eq!(parsed["isUnfinalized"], true);
}

#[test]
fn test_minutes_new_with_unknown_series_fails() {
    let tmp = TempDir::new().unwrap();

    plenum_cmd()
        .current_dir(tmp.path())
        .args(["init"])
        .output()
        .unwrap();

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "new", "--series=nope", "--date=2024-03-01"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Meeting series not found"));
}

#[test]
fn test_outbox_queues_with_autosync_off() {
    let tmp = TempDir::new().unwrap();
    let series_id = init_with_series(&tmp);

    std::fs::write(
        tmp.path().join(".plenum/config.yaml"),
        "autosync: false\n",
    )
    .unwrap();

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args([
            "minutes",
            "new",
            &format!("--series={}", series_id),
            "--date=2024-03-01",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Queued minutes"));

    // Nothing in the cache yet, two calls waiting
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "list"])
        .output()
        .unwrap();
    assert!(stdout_of(&output).contains("No minutes found"));

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["outbox"])
        .output()
        .unwrap();
    let stdout = stdout_of(&output);
    assert!(stdout.contains("minutes.insert"));
    assert!(stdout.contains("meetingseries.update"));

    // Drain manually
    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["sync"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Applied 2 call(s)"));

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["minutes", "list"])
        .output()
        .unwrap();
    assert!(stdout_of(&output).contains("2024-03-01"));

    let output = plenum_cmd()
        .current_dir(tmp.path())
        .args(["outbox"])
        .output()
        .unwrap();
    assert!(stdout_of(&output).contains("Outbox is empty"));
}
