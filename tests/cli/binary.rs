//! End-to-end runs of the `handoff` binary

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn handoff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_handoff"))
        .args(["--log-file", "none", "--no-color"])
        .args(args)
        .output()
        .expect("failed to run handoff")
}

#[test]
fn test_fast_run_prints_json_report() {
    let output = handoff(&[
        "--items",
        "30",
        "--producer-delay-ms",
        "0",
        "--consumer-delay-ms",
        "0",
        "--capacity",
        "3",
        "--log-level",
        "off",
        "--output",
        "json",
    ]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["source_items"], 30);
    assert_eq!(report["total_consumed"], 30);
    assert_eq!(report["sink_items"], 30);
    assert_eq!(report["queue_remaining"], 0);
    assert_eq!(report["producers"].as_array().unwrap().len(), 2);
    assert_eq!(report["sink_sample"].as_array().unwrap().len(), 10);
}

#[test]
fn test_text_report() {
    let output = handoff(&[
        "-n",
        "4",
        "--producer-delay-ms",
        "0",
        "--consumer-delay-ms",
        "0",
        "-l",
        "off",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pipeline run complete"));
    assert!(stdout.contains("consumer-2"));
    assert!(stdout.contains("Sink sample"));
}

#[test]
fn test_config_file_applies() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "items = 6\nproducers = 1\nconsumers = 3\n\
         producer-delay-ms = 0\nconsumer-delay-ms = [0, 0, 0]\n\
         output = \"json\"\nlog-level = \"off\""
    )
    .unwrap();

    let output = handoff(&["-c", file.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["source_items"], 6);
    assert_eq!(report["consumers"].as_array().unwrap().len(), 3);
}

#[test]
fn test_invalid_config_exits_with_one() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "capacity = 0").unwrap();

    let output = handoff(&["-c", file.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("capacity"));
}

#[test]
fn test_oversized_dataset_exits_with_one() {
    let output = handoff(&["--items", "999999999999", "-l", "off"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("'items' must be at most"));
}

#[test]
fn test_bad_argument_exits_with_one() {
    let output = handoff(&["--consumers", "0"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_exits_cleanly() {
    let output = handoff(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--poll-timeout-ms"));
}
