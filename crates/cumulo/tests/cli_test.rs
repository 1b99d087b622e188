// CLI surface tests: argument parsing and help output via assert_cmd.
// Nothing here talks to a tenant.

use assert_cmd::Command;
use predicates::prelude::*;

fn cumulo() -> Command {
    Command::cargo_bin("cumulo").expect("binary builds")
}

#[test]
fn no_args_shows_help() {
    cumulo()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_command_groups() {
    cumulo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("devices"))
        .stdout(predicate::str::contains("alarms"))
        .stdout(predicate::str::contains("operations"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn devices_subcommands_present() {
    cumulo()
        .args(["devices", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("restart"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn alarms_raise_requires_type_and_text() {
    cumulo()
        .args(["alarms", "raise", "4201"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--alarm-type"));
}

#[test]
fn watch_filters_are_exclusive() {
    cumulo()
        .args(["watch", "--alarms", "--events"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn config_path_needs_no_connection() {
    cumulo()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn completions_generate_bash() {
    cumulo()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cumulo"));
}

#[test]
fn missing_config_is_a_clean_error() {
    cumulo()
        .env_remove("C8Y_URL")
        .env_remove("C8Y_USERNAME")
        .env_remove("C8Y_PASSWORD")
        .env("C8Y_PROFILE", "no-such-profile-xyz")
        .args(["devices", "list"])
        .assert()
        .failure();
}
