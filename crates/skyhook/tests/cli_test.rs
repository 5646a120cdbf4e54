//! Integration tests for the `skyhook` CLI binary.
//!
//! Every run uses its own simulator; config files live in temp dirs.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// `skyhook` with env isolation: no `SKYHOOK_*` overrides, no real config.
fn skyhook_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("skyhook");
    cmd.env("HOME", "/tmp/skyhook-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/skyhook-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("SKYHOOK_PROFILE")
        .env_remove("SKYHOOK_CONFIG")
        .env_remove("SKYHOOK_OUTPUT");
    cmd
}

fn with_config(path: &Path) -> assert_cmd::Command {
    let mut cmd = skyhook_cmd();
    cmd.arg("--config").arg(path);
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = skyhook_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    skyhook_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("screens"))
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    skyhook_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("skyhook"));
}

#[test]
fn test_completions_zsh() {
    skyhook_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Screens ─────────────────────────────────────────────────────────

#[test]
fn test_screens_lists_steps() {
    skyhook_cmd()
        .args(["--output", "plain", "screens"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("hello-drone take-off-land")
                .and(predicate::str::contains("camera wb:MODE"))
                .and(predicate::str::contains("replay open:SOURCE"))
                .and(predicate::str::contains("any battery:N")),
        );
}

// ── Run ─────────────────────────────────────────────────────────────

#[test]
fn test_run_hello_drone_json() {
    let output = skyhook_cmd()
        .args(["-o", "json", "run", "hello-drone", "--steps", "take-off-land"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let frames: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let frames = frames.as_array().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["view"]["screen"], "hello-drone");
    assert_eq!(frames[0]["view"]["drone_state"], "connected");
    assert_eq!(frames[1]["step"], "take-off-land");
    assert_eq!(frames[1]["outcome"]["outcome"], "sent");
    assert_eq!(frames[1]["view"]["take_off_land"]["label"], "Land");
}

#[test]
fn test_run_plain_prints_last_view() {
    skyhook_cmd()
        .args([
            "-o",
            "plain",
            "run",
            "camera",
            "--steps",
            "mode:recording,capture",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("camera api=legacy")
                .and(predicate::str::contains("capture=Stop recording")),
        );
}

#[test]
fn test_run_table_has_one_section_per_step() {
    skyhook_cmd()
        .args(["run", "replay", "--steps", "open:flight.mp4,seek:30"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("── open ──")
                .and(predicate::str::contains("open:flight.mp4 (opened replay:flight.mp4)"))
                .and(predicate::str::contains("00:30 / 01:00")),
        );
}

#[test]
fn test_run_unknown_step_is_usage_error() {
    skyhook_cmd()
        .args(["run", "camera", "--steps", "capture,fly"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown step 'fly'"));
}

#[test]
fn test_run_step_on_wrong_screen() {
    skyhook_cmd()
        .args(["run", "hello-drone", "--steps", "palette"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("not available on the hello-drone screen"));
}

#[test]
fn test_run_unknown_profile() {
    skyhook_cmd()
        .args(["--profile", "lab", "run", "hello-drone"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Profile 'lab' not found"));
}

#[test]
fn test_invalid_screen() {
    let output = skyhook_cmd().args(["run", "map"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("invalid value") || text.contains("possible values"),
        "Expected error about valid screens:\n{text}"
    );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    let dir = tempfile::tempdir().unwrap();
    with_config(&dir.path().join("config.toml"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile = \"default\""));
}

#[test]
fn test_config_path_honors_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    with_config(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_profiles_and_use() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    with_config(&path).args(["config", "init"]).assert().success();
    assert!(path.exists());

    with_config(&path)
        .args(["config", "init"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("already exists"));

    with_config(&path)
        .args(["-o", "plain", "config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *").and(predicate::str::contains("thermal")));

    with_config(&path).args(["config", "use", "thermal"]).assert().success();
    with_config(&path)
        .args(["-o", "plain", "config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("thermal *"));

    with_config(&path)
        .args(["config", "use", "lab"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("default, thermal"));
}

#[test]
fn test_thermal_profile_drives_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    with_config(&path).args(["config", "init"]).assert().success();

    with_config(&path)
        .args([
            "--profile",
            "thermal",
            "-o",
            "plain",
            "run",
            "thermal",
            "--steps",
            "palette",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("thermal mode=standard")
                .and(predicate::str::contains("palette=absolute 300.0-310.0 K, 2 colors")),
        );
}

#[test]
fn test_invalid_profile_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[profiles.default]\ndrone_battery = 150\n").unwrap();

    with_config(&path)
        .args(["run", "hello-drone"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("drone_battery"));
}
