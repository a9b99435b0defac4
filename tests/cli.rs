//! Exit-status tests for the blklat binary
//!
//! None of these reach the IO loop: each case either prints usage or fails
//! before a device could be written.

use std::process::{Command, Output};
use tempfile::TempDir;

fn blklat(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blklat"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn blklat")
}

#[test]
fn test_help_exits_zero() {
    let out = blklat(&["-h"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Instant Disk Latency Measurement Tool"));
    assert!(stdout.contains("DEV_NAME"));
}

#[test]
fn test_version_exits_zero() {
    let out = blklat(&["--version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_device_exits_one() {
    let out = blklat(&[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_zero_block_size_exits_one() {
    let out = blklat(&["-b", "0", "/nonexistent/blklat-device"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid buffer size"));
}

#[test]
fn test_negative_block_size_exits_one() {
    let out = blklat(&["-b", "-5", "/nonexistent/blklat-device"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_zero_iterations_exits_one() {
    let out = blklat(&["/nonexistent/blklat-device", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Iteration counter"));
}

#[test]
fn test_repeated_flag_exits_one() {
    let out = blklat(&["-s", "-s", "/nonexistent/blklat-device"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_unknown_flag_exits_one() {
    let out = blklat(&["-q", "/nonexistent/blklat-device"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_nonexistent_device_exits_one_without_reports() {
    let out = blklat(&["-s", "/nonexistent/blklat-device", "1"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error opening block device"));
}

#[test]
fn test_config_file_unknown_key_exits_one() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blklat.toml");
    std::fs::write(&path, "device = \"/nonexistent/blklat-device\"\nqueue_depth = 4\n").unwrap();

    let out = blklat(&["--config", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_config_file_supplies_device() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blklat.toml");
    std::fs::write(&path, "device = \"/nonexistent/blklat-device\"\niterations = 1\n").unwrap();

    // Device comes from the file, so the failure is the open, not a usage error
    let out = blklat(&["--config", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("/nonexistent/blklat-device"));
}
