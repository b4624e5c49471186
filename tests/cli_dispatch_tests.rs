use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use tiered_dispatch::cli::demo_request;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_tiered-dispatch")
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("tiered-dispatch-{name}-{stamp}.{ext}"))
}

fn write_demo_request(name: &str) -> PathBuf {
    let path = unique_temp_path(name, "json");
    let body = serde_json::to_string(&demo_request(5)).expect("demo request should serialize");
    fs::write(&path, body).expect("fixture should be written");
    path
}

fn dispatch() -> Command {
    let mut command = Command::new(bin());
    command.env_remove("DISPATCH_CONFIG").env("RUST_LOG", "off");
    command
}

#[test]
fn demo_command_emits_json() {
    let output = dispatch().arg("demo").output().expect("demo should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("demo should emit json");
    assert_eq!(payload["assignments"].as_array().map(Vec::len), Some(3));
    assert!((payload["value"].as_f64().unwrap_or(0.0) - 185.0).abs() < 1e-6);
}

#[test]
fn solve_command_prints_table() {
    let path = write_demo_request("solve");
    let output = dispatch()
        .args(["solve", path.to_string_lossy().as_ref(), "--table"])
        .output()
        .expect("solve should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("unit_id\tincident_id\ttier\tcost"));
    assert!(stdout.contains("1\t2\tRoutine\t35.000"));
    assert!(stdout.contains("value\t185.000"));

    let _ = fs::remove_file(path);
}

#[test]
fn solve_command_returns_usage_without_path() {
    let output = dispatch().arg("solve").output().expect("solve should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: tiered-dispatch solve"));
}

#[test]
fn validate_command_returns_non_zero_on_invalid_request() {
    let path = unique_temp_path("invalid", "json");
    fs::write(
        &path,
        r#"{"units":[{"id":1,"lat":0,"lon":0,"capability":-1}],"incidents":[]}"#,
    )
    .expect("fixture should be written");

    let output = dispatch()
        .args(["validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed: 1 issue(s)"));
    assert!(stderr.contains("units[0].capability"));

    let _ = fs::remove_file(path);
}

#[test]
fn batch_command_solves_every_file() {
    let first = write_demo_request("batch-a");
    let second = write_demo_request("batch-b");
    let output = dispatch()
        .args([
            "batch",
            first.to_string_lossy().as_ref(),
            second.to_string_lossy().as_ref(),
            "--workers",
            "2",
        ])
        .output()
        .expect("batch should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("batch should emit json");
    let items = payload.as_array().expect("batch output should be an array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"].as_str(), Some(&*first.to_string_lossy()));
    assert!(items.iter().all(|item| item["result"]["value"] == 185.0));

    let _ = fs::remove_file(first);
    let _ = fs::remove_file(second);
}

#[test]
fn config_flag_changes_tier_order() {
    let config = unique_temp_path("config", "yaml");
    fs::write(&config, "tiers: [Routine, Immediate, Urgent, Non-Urgent]\n")
        .expect("config should be written");

    let output = dispatch()
        .args(["--config", config.to_string_lossy().as_ref(), "demo"])
        .output()
        .expect("demo should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("demo should emit json");
    assert_eq!(payload["tiers"][0]["label"], "Routine");
    assert_eq!(payload["assignments"][0]["incident_id"], 2);

    let _ = fs::remove_file(config);
}

#[test]
fn demo_command_rejects_too_few_categories() {
    let config = unique_temp_path("two-categories", "yaml");
    fs::write(&config, "categories: 2\n").expect("config should be written");

    let output = dispatch()
        .args(["demo", "--config", config.to_string_lossy().as_ref()])
        .output()
        .expect("demo should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("demo needs at least 3 capability categories, config has 2"));
    assert!(output.stdout.is_empty());

    let _ = fs::remove_file(config);
}

#[test]
fn unknown_command_prints_usage() {
    let output = dispatch().arg("launch").output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: tiered-dispatch"));
}
