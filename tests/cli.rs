//! Binary-level tests for the pkghint CLI.

use assert_cmd::Command;

#[test]
fn hooks_prints_the_integration_script() {
    let output = Command::cargo_bin("pkghint")
        .unwrap()
        .args(["hooks", "--shell", "bash"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let script = String::from_utf8_lossy(&output.stdout);
    assert!(script.contains("command_not_found_handle()"));
    assert!(script.contains("PKGHINT_HOOK_START"));
    assert!(script.contains("PKGHINT_HOOK_END"));
}

#[test]
fn hooks_rejects_unsupported_shells() {
    Command::cargo_bin("pkghint")
        .unwrap()
        .args(["hooks", "--shell", "tcsh"])
        .assert()
        .failure();
}

#[test]
fn command_error_with_clean_exit_is_silent() {
    let output = Command::cargo_bin("pkghint")
        .unwrap()
        .args(["command-error", "0"])
        .env_remove("PKGHINT_LAST_CMD")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn command_error_short_circuits_interrupt_and_not_found_codes() {
    for code in ["127", "130"] {
        Command::cargo_bin("pkghint")
            .unwrap()
            .args(["command-error", code])
            .env_remove("PKGHINT_LAST_CMD")
            .assert()
            .success();
    }
}

#[test]
fn version_prints_the_crate_version() {
    let output = Command::cargo_bin("pkghint")
        .unwrap()
        .arg("version")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
