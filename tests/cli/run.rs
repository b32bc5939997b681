//! Tests for `vaultrun run` in the default exec mode.

use crate::support::*;
use serde_json::json;

fn scenario(vault: &MockVault) -> Test {
    let mut t = Test::with_vault(vault);
    for (name, value) in SCENARIO_ENV {
        t = t.var(name, value);
    }
    t
}

#[test]
fn test_run_resolves_scenario() {
    let vault = MockVault::start();
    vault
        .secret("kv/db", json!({ "password": "p@ss" }))
        .secret("secret/other", json!({ "token": "tok123" }));
    let t = scenario(&vault);

    let output = t.run(&["env"]);
    assert_success(&output);
    let lines = env_lines(&output);
    assert!(lines.contains(&"PLAIN=hello".to_string()));
    assert!(lines.contains(&"FOO=p@ss".to_string()));
    assert!(lines.contains(&"BAR=tok123".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("VAULTRUN_")));
    assert!(!lines.iter().any(|l| l.starts_with("VAULT_")));
    vault.verify();
}

#[test]
fn test_run_reads_each_path_once() {
    let vault = MockVault::start();
    vault.secret("secret/db", json!({ "user": "admin", "password": "p@ss" }));
    let t = Test::with_vault(&vault)
        .var("DB_USER", "$v:db#user")
        .var("DB_PASS", "$v:db#password")
        .var("DB_PASS_AGAIN", "$v!:secret/db#password");

    let output = t.sh("echo $DB_USER:$DB_PASS:$DB_PASS_AGAIN");
    assert_success(&output);
    assert_stdout_contains(&output, "admin:p@ss:p@ss");
    assert_eq!(vault.request_count(), 1);
    vault.verify();
}

#[test]
fn test_run_without_references_skips_vault() {
    let t = Test::new()
        .var("VAULT_ADDR", DEAD_VAULT_ADDR)
        .var("GREETING", "hello");

    let output = t.sh("echo $GREETING");
    assert_success(&output);
    assert_stdout_contains(&output, "hello");
}

#[test]
fn test_run_mirrors_exit_code() {
    let t = Test::new();
    let output = t.sh("exit 42");
    assert_exit_code(&output, 42);
}

#[test]
fn test_run_passes_arguments_verbatim() {
    let t = Test::new();
    let output = t.run(&["printf", "%s|", "--flag", "two words", "$v:not#expanded"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "--flag|two words|$v:not#expanded|");
}

#[test]
fn test_run_default_path_flag_wins() {
    let vault = MockVault::start();
    vault.secret("team/app/db", json!({ "password": "from-flag" }));
    let t = Test::with_vault(&vault)
        .var("VAULTRUN_DEFAULT_PATH", "kv")
        .var("DB_PASS", "$v:db#password");

    let output = t
        .cmd()
        .args(["--default-path", "team/app/", "run", "sh", "-c", "echo $DB_PASS"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "from-flag");
    vault.verify();
}

#[test]
fn test_run_passes_malformed_reference_through() {
    let t = Test::new().var("X", MALFORMED_VALUE);

    let output = t.sh("echo \"$X\"");
    assert_success(&output);
    assert_stdout_contains(&output, MALFORMED_VALUE);
    assert_stderr_contains(&output, "environment variable 'X' looks like a vault reference");
}

#[test]
fn test_run_missing_field_aborts_before_launch() {
    let vault = MockVault::start();
    vault.secret("secret/db", json!({ "user": "admin" }));
    let t = Test::with_vault(&vault).var("DB_PASS", "$v:db#password");

    let output = t.sh("echo launched");
    assert_exit_code(&output, 1);
    assert_stdout_excludes(&output, "launched");
    assert_stderr_contains(&output, "secret secret/db has no field password");
}

#[test]
fn test_run_missing_secret_aborts() {
    let vault = MockVault::start();
    vault.status("secret/gone", 404);
    let t = Test::with_vault(&vault).var("TOKEN", "$v:gone#token");

    let output = t.sh("echo launched");
    assert_exit_code(&output, 1);
    assert_stdout_excludes(&output, "launched");
    assert_stderr_contains(&output, "secret not found: secret/gone");
}

#[test]
fn test_run_permission_denied_aborts() {
    let vault = MockVault::start();
    vault.status("secret/locked", 403);
    let t = Test::with_vault(&vault).var("TOKEN", "$v:locked#token");

    let output = t.sh("echo launched");
    assert_exit_code(&output, 1);
    assert_stdout_excludes(&output, "launched");
    assert_stderr_contains(&output, "permission denied reading secret secret/locked");
    assert_stderr_contains(&output, "VAULT_TOKEN");
}

#[test]
fn test_run_unreachable_vault_aborts() {
    let t = Test::new()
        .var("VAULT_ADDR", DEAD_VAULT_ADDR)
        .var("VAULT_TOKEN", ROOT_TOKEN)
        .var("TOKEN", "$v:app#token");

    let output = t.sh("echo launched");
    assert_exit_code(&output, 1);
    assert_stdout_excludes(&output, "launched");
    assert_stderr_contains(&output, "vault unreachable while reading secret/app");
    assert_stderr_contains(&output, "check VAULT_ADDR");
}

#[test]
fn test_run_drops_connection_variables_even_with_markers() {
    let t = Test::new()
        .var("VAULT_NAMESPACE", "")
        .var("VAULTRUN_EXTRA", "$v:looks#like-a-ref")
        .var("KEPT", "yes");

    let output = t.run(&["env"]);
    assert_success(&output);
    let lines = env_lines(&output);
    assert!(lines.contains(&"KEPT=yes".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("VAULTRUN_EXTRA")));
    assert!(!lines.iter().any(|l| l.starts_with("VAULT_NAMESPACE")));
}

#[test]
fn test_run_executable_not_found() {
    let t = Test::new();
    let output = t.run(&["vaultrun-no-such-program"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "executable not found: vaultrun-no-such-program");
}

#[test]
fn test_run_uses_token_helper_file() {
    let vault = MockVault::start();
    vault.secret_with_token("secret/app", "helper-token", json!({ "key": "v1" }));
    let t = Test::new()
        .var("VAULT_ADDR", &vault.uri())
        .var("APP_KEY", "$v:app#key");
    std::fs::write(t.home.path().join(".vault-token"), "helper-token\n").unwrap();

    let output = t.sh("echo $APP_KEY");
    assert_success(&output);
    assert_stdout_contains(&output, "v1");
    vault.verify();
}

#[test]
fn test_run_forwards_stdin() {
    let t = Test::new();
    let output = t
        .cmd()
        .args(["run", "cat"])
        .write_stdin("piped through\n")
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output), "piped through\n");
}
