//! Tests for the spawn-and-wait launch mode.

use crate::support::*;
use serde_json::json;

#[test]
fn test_spawn_flag_mirrors_exit_code() {
    let t = Test::new();
    let output = t.run_spawn(&["sh", "-c", "exit 7"]);
    assert_exit_code(&output, 7);
}

#[test]
fn test_launch_mode_variable_selects_spawn() {
    let t = Test::new().var("VAULTRUN_LAUNCH_MODE", "spawn");
    let output = t.sh("exit 7");
    assert_exit_code(&output, 7);
}

#[test]
fn test_spawn_success() {
    let t = Test::new();
    let output = t.run_spawn(&["true"]);
    assert_exit_code(&output, 0);
}

#[test]
fn test_spawn_signal_death_exits_one() {
    let t = Test::new();
    let output = t.run_spawn(&["sh", "-c", "kill -9 $$"]);
    assert_exit_code(&output, 1);
}

#[test]
fn test_spawn_resolves_secrets() {
    let vault = MockVault::start();
    vault.secret("secret/api", json!({ "key": "k-123" }));
    let t = Test::with_vault(&vault).var("API_KEY", "$v:api#key");

    let output = t.run_spawn(&["sh", "-c", "echo $API_KEY"]);
    assert_success(&output);
    assert_stdout_contains(&output, "k-123");
    vault.verify();
}

#[test]
fn test_spawn_hides_connection_variables() {
    let t = Test::new()
        .var("VAULTRUN_LAUNCH_MODE", "spawn")
        .var("VAULT_ADDR", DEAD_VAULT_ADDR);

    let output = t.run(&["env"]);
    assert_success(&output);
    assert_stdout_excludes(&output, "VAULTRUN_LAUNCH_MODE");
    assert_stdout_excludes(&output, "VAULT_ADDR");
}

/// Start `vaultrun run --spawn` on a shell that traps `trapped`, wait until
/// the trap is installed, then signal vaultrun itself.
fn relay_signal(trapped: &str, sig: nix::sys::signal::Signal) -> std::process::Output {
    use std::io::{BufRead, BufReader};
    use std::process::Stdio;

    let script = format!(
        "trap 'echo got-{trapped}; exit 9' {trapped}; echo ready; while :; do sleep 0.1; done"
    );
    let mut child = Test::new()
        .process()
        .args(["run", "--spawn", "sh", "-c", &script])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut line = String::new();
    stdout.read_line(&mut line).unwrap();
    assert_eq!(line.trim(), "ready");

    let pid = nix::unistd::Pid::from_raw(child.id() as i32);
    nix::sys::signal::kill(pid, sig).unwrap();

    let mut rest = String::new();
    std::io::Read::read_to_string(&mut stdout, &mut rest).unwrap();
    let mut output = child.wait_with_output().unwrap();
    output.stdout = rest.into_bytes();
    output
}

#[test]
fn test_spawn_forwards_sigterm() {
    let output = relay_signal("TERM", nix::sys::signal::Signal::SIGTERM);
    assert_exit_code(&output, 9);
    assert_stdout_contains(&output, "got-TERM");
}

#[test]
fn test_spawn_forwards_sighup() {
    let output = relay_signal("HUP", nix::sys::signal::Signal::SIGHUP);
    assert_exit_code(&output, 9);
    assert_stdout_contains(&output, "got-HUP");
}

#[test]
fn test_spawn_forwards_sigint() {
    let output = relay_signal("INT", nix::sys::signal::Signal::SIGINT);
    assert_exit_code(&output, 9);
    assert_stdout_contains(&output, "got-INT");
}
