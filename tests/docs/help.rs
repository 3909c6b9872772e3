//! Help documentation and CLI flag tests.
//!
//! Run with:
//!   cargo test --test docs

use std::process::Command;

fn help_output() -> String {
    let out = Command::new(env!("CARGO_BIN_EXE_validate-skills"))
        .arg("--help")
        .output()
        .expect("run validate-skills --help");
    assert!(out.status.success(), "--help should exit 0");
    String::from_utf8_lossy(&out.stdout).into_owned()
}

// =============================================================================
// CLI Help Tests
// =============================================================================

#[test]
fn test_help_lists_every_flag() {
    let help = help_output();
    for flag in [
        "--root",
        "--max-lines",
        "--format",
        "--strict",
        "--config",
        "--jobs",
        "--verbose",
        "--quiet",
    ] {
        assert!(help.contains(flag), "help should document {flag}");
    }
}

#[test]
fn test_help_lists_formats() {
    let help = help_output();
    assert!(help.contains("text"));
    assert!(help.contains("json"));
}

#[test]
fn test_short_help_flag() {
    let short = Command::new(env!("CARGO_BIN_EXE_validate-skills"))
        .arg("-h")
        .output()
        .expect("run validate-skills -h");
    assert!(short.status.success());
    assert!(!short.stdout.is_empty(), "-h should print usage");
}

#[test]
fn test_version_flag() {
    let out = Command::new(env!("CARGO_BIN_EXE_validate-skills"))
        .arg("--version")
        .output()
        .expect("run validate-skills --version");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "version output should contain the crate version"
    );
}

// =============================================================================
// Error Message Tests
// =============================================================================

#[test]
fn test_unknown_flag_is_usage_error() {
    let out = Command::new(env!("CARGO_BIN_EXE_validate-skills"))
        .arg("--no-such-flag")
        .output()
        .expect("run validate-skills");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--no-such-flag"), "error should name the bad flag");
}
