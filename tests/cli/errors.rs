//! Tests for configuration and usage errors.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_kube_role_without_path() {
    let t = Test::new()
        .var("VAULTRUN_KUBE_ROLE", "app")
        .var("TOKEN", "$v:app#token");

    let output = t.sh("echo launched");
    assert_exit_code(&output, 1);
    assert_stdout_excludes(&output, "launched");
    assert_stderr_contains(&output, "VAULTRUN_KUBE_ROLE and VAULTRUN_KUBE_PATH must both be set");
}

#[test]
fn test_kube_path_without_role() {
    let t = Test::new().var("VAULTRUN_KUBE_PATH", "auth/kubernetes/login");
    let output = t.sh("echo launched");
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "must both be set");
}

#[test]
fn test_invalid_launch_mode() {
    let t = Test::new().var("VAULTRUN_LAUNCH_MODE", "fork");
    let output = t.sh("echo launched");
    assert_failure(&output);
    assert_stdout_excludes(&output, "launched");
    assert_stderr_contains(&output, "VAULTRUN_LAUNCH_MODE");
}

#[test]
fn test_invalid_client_timeout() {
    let t = Test::new().var("VAULT_CLIENT_TIMEOUT", "soon");
    let output = t.sh("echo launched");
    assert_failure(&output);
    assert_stderr_contains(&output, "VAULT_CLIENT_TIMEOUT");
}

#[test]
fn test_run_requires_program() {
    let output = Test::new().cmd().arg("run").output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "PROGRAM");
}

#[test]
fn test_completions() {
    Test::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vaultrun"));
}

#[test]
fn test_unknown_shell_rejected() {
    Test::new()
        .cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_error_hint_for_incomplete_kube_settings() {
    Test::new()
        .var("VAULTRUN_KUBE_ROLE", "app")
        .cmd()
        .args(["run", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("✗ ").and(predicate::str::contains("→ set both variables")));
}
