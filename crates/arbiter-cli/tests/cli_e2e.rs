//! End-to-end CLI tests using `assert_cmd`
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::tests_outside_test_module,
        reason = "Test allows"
    )
)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get cargo binary or fail test
fn cargo_bin(home: &TempDir) -> Command {
    let mut command =
        Command::cargo_bin("arbiter").unwrap_or_else(|err| panic!("Binary not found: {err}"));
    // Isolate config and restrictions from the invoking environment.
    command.env("HOME", home.path());
    for var in [
        "OPENAI_ALLOWED_MODELS",
        "GOOGLE_ALLOWED_MODELS",
        "ANTHROPIC_ALLOWED_MODELS",
        "BLOCKED_MODELS",
        "DISABLED_MODEL_PATTERNS",
    ] {
        command.env_remove(var);
    }
    command
}

fn temp_home() -> TempDir {
    TempDir::new().unwrap_or_else(|err| panic!("Failed to create temp dir: {err}"))
}

#[test]
fn test_cli_help() {
    let home = temp_home();
    cargo_bin(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_invalid_command() {
    let home = temp_home();
    cargo_bin(&home).arg("invalid-command-xyz").assert().failure();
}

#[test]
fn test_models_lists_catalog() {
    let home = temp_home();
    cargo_bin(&home)
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.5-flash"))
        .stdout(predicate::str::contains("claude-sonnet-4"))
        .stdout(predicate::str::contains("allowed"));
}

#[test]
fn test_models_marks_restricted_entries() {
    let home = temp_home();
    cargo_bin(&home)
        .arg("models")
        .env("BLOCKED_MODELS", "gpt-4o")
        .assert()
        .success()
        .stdout(predicate::str::contains("restricted"));
}

#[test]
fn test_ask_rejects_unknown_mode() {
    let home = temp_home();
    cargo_bin(&home)
        .args(["ask", "hello", "--mode", "bogus"])
        .assert()
        .failure();
}

#[test]
fn test_ask_rejects_empty_prompt() {
    let home = temp_home();
    cargo_bin(&home)
        .args(["ask", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Prompt"));
}

#[test]
fn test_ask_rejects_deprecated_model() {
    let home = temp_home();
    cargo_bin(&home)
        .args(["ask", "hello", "--model", "gpt-3.5-turbo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("deprecated"));
}

#[test]
fn test_serve_replies_to_malformed_line() {
    let home = temp_home();
    cargo_bin(&home)
        .arg("serve")
        .write_stdin("this is not json\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("malformed_request"));
}

#[test]
fn test_serve_categorizes_validation_errors() {
    let home = temp_home();
    cargo_bin(&home)
        .arg("serve")
        .write_stdin("{\"prompt\": \"\"}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"validation\""));
}

#[test]
fn test_first_run_creates_config() {
    let home = temp_home();
    cargo_bin(&home).arg("models").assert().success();
    assert!(home.path().join(".arbiter").join("config.toml").exists());
}
