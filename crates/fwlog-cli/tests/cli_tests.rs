//! CLI integration tests
//!
//! Run the `fwlog` binary and parse its stdout as JSON lines.

use std::collections::HashMap;
use std::process::{Command, Output};

use serde_json::Value;

fn fwlog(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_fwlog"));
    command.args(args);
    for key in [
        "LOGGER_NAME",
        "LOGGER_LEVEL",
        "LOGGER_ISO_TIMESTAMP",
        "LOGGER_USE_SEVERITY_STRING",
        "LOGGER_REDACT_PATHS",
    ] {
        command.env_remove(key);
    }
    command.envs(env.iter().copied());
    command.output().expect("Failed to execute CLI")
}

fn records(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

#[test]
fn test_emit_writes_redacted_record_with_request_id() {
    let output = fwlog(
        &[
            "emit",
            "--message",
            "hello",
            "--field",
            "url=/cb?access_token=abc123&x=1",
            "--field",
            "attempt=2",
            "--request-id",
            "r-7",
        ],
        &[("LOGGER_NAME", "cli-test")],
    );
    assert!(output.status.success());

    let records = records(&output);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["msg"], "hello");
    assert_eq!(record["name"], "cli-test");
    assert_eq!(record["level"], 30);
    assert_eq!(record["request_id"], "r-7");
    assert_eq!(record["attempt"], 2);
    assert_eq!(record["url"], "/cb?access_token=***&x=1");
}

#[test]
fn test_debug_level_shows_initialization_record_first() {
    let output = fwlog(
        &["emit", "--message", "after init", "--level", "debug"],
        &[("LOGGER_LEVEL", "debug"), ("LOGGER_USE_SEVERITY_STRING", "true")],
    );
    assert!(output.status.success());

    let records = records(&output);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["msg"], "Logger initialized");
    assert_eq!(records[0]["severity"], "debug");
    assert_eq!(records[1]["msg"], "after init");
}

#[test]
fn test_malformed_field_is_rejected() {
    let output = fwlog(&["emit", "--message", "x", "--field", "novalue"], &[]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_level_configuration_is_reported() {
    for command in [&["emit", "--message", "never written"][..], &["simulate"][..]] {
        let output = fwlog(command, &[("LOGGER_LEVEL", "loud")]);

        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("loud"), "stderr: {stderr}");
    }
}

#[test]
fn test_simulate_keeps_request_loggers_apart() {
    let output = fwlog(&["simulate", "--requests", "5"], &[]);
    assert!(output.status.success());

    let mut by_request: HashMap<String, Vec<Value>> = HashMap::new();
    for record in records(&output) {
        let id = record["request_id"]
            .as_str()
            .expect("every simulated record carries a request id")
            .to_string();
        by_request.entry(id).or_default().push(record);
    }
    assert_eq!(by_request.len(), 5);

    for (id, records) in &by_request {
        assert_eq!(records.len(), 4);
        let continuation = records
            .iter()
            .find(|r| r["msg"] == "continuation finished")
            .expect("continuation record");
        assert_eq!(continuation["bound_request_id"].as_str(), Some(id.as_str()));

        let received = records
            .iter()
            .find(|r| r["msg"] == "request received")
            .expect("request record");
        assert!(received["url"].as_str().unwrap().ends_with("access_token=***"));
        assert_eq!(received["req"]["authorization"], "Bearer ***");
    }
}
