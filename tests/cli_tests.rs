//! CLI integration tests
//!
//! Startup failures must print the usage banner and exit non-zero without
//! scheduling anything.

use std::fs;
use std::process::Command;

fn healthcheck() -> Command {
    Command::new(env!("CARGO_BIN_EXE_healthcheck"))
}

#[test]
fn test_missing_file_flag_prints_usage() {
    let output = healthcheck().output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("SYNOPSIS"));
    assert!(stderr.contains("Configuration file not provided"));
}

#[test]
fn test_unreadable_config_exits_non_zero() {
    let output = healthcheck()
        .args(["-f", "/definitely/not/here.yml"])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("failed to read"));
}

#[test]
fn test_zero_schedule_rejected_before_scheduling() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.yml");
    fs::write(&path, "schedule: 0\njobs:\n  - endpoint: /ping\n    body: pong\n").unwrap();

    let output = healthcheck().arg("-f").arg(&path).output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stderr.contains("config.schedule not set"));
    assert!(!stdout.contains("Scheduler started"));
}

#[test]
fn test_job_without_body_names_the_job() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.toml");
    fs::write(
        &path,
        "schedule = 1000\n\n[[jobs]]\nname = \"users\"\nendpoint = \"/users\"\n",
    )
    .unwrap();

    let output = healthcheck().arg("--file").arg(&path).output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("No expected body provided for users"));
}

#[test]
fn test_version_flag() {
    let output = healthcheck().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(healthcheck::version::VERSION));
}
