use assert_cmd::Command;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tempfile::tempdir;

const CONFIG: &str = r#"{
    "measurement": "rhok",
    "tags": { "towerName": "tower-1", "towerGroup": "north" },
    "db": { "host_name": "127.0.0.1", "host_port": 1, "dbname": "towers", "username": "bridge", "ssl": false },
    "arduino": { "baud_rate": 9600, "serial_port": "/dev/tower-does-not-exist" },
    "water_level": { "sensor_height": 60.0, "max_water_level": 40.0, "min_water_level": 10.0 },
    "light_sensor": {
        "expected_start_on_hour": 0, "expected_start_on_min": 0,
        "expected_start_off_hour": 23, "expected_start_off_min": 59
    }
}"#;

fn write_config(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, text).unwrap();
    path
}

fn write_capture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("capture.txt");
    fs::write(
        &path,
        "35.0,55.2,21.5,19.0,6.8,x,x,x,x\r\n\
         35.0,55.2,21.5,19.0,6.8,x,x,x\r\n\
         20.0,abc,22.0,19.5,7.0,x,x,x,x\r\n",
    )
    .unwrap();
    path
}

fn tower() -> Command {
    let mut cmd = Command::cargo_bin("tower").unwrap();
    cmd.env_remove("TOWER_DB_PASSWORD").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_flags() {
    tower()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--no-prompt"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn replay_dry_run_prints_one_json_list_per_good_row() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, CONFIG);
    let capture = write_capture(&dir);

    let out = tower()
        .arg("--config")
        .arg(&cfg)
        .args(["--no-prompt", "--dry-run", "--replay"])
        .arg(&capture)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let rows: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 2, "short row must be dropped: {stdout}");

    let first = &rows[0][0];
    assert_eq!(first["measurement"], "rhok");
    assert_eq!(first["tags"]["towerName"], "tower-1");
    assert_eq!(first["fields"]["water_level"], 50.0);
    assert_eq!(first["fields"].as_object().unwrap().len(), 5);

    let second = &rows[1][0];
    assert_eq!(second["fields"]["water_level"], 100.0);
    assert!(second["fields"].get("air_humidity").is_none());
}

#[rstest]
#[case::sequential(&[])]
#[case::queued(&["--queue", "2"])]
fn replay_modes_agree(#[case] extra: &[&str]) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, CONFIG);
    let capture = write_capture(&dir);

    tower()
        .arg("--config")
        .arg(&cfg)
        .args(["--no-prompt", "--dry-run", "--replay"])
        .arg(&capture)
        .args(extra)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pH\":6.8"))
        .stderr(predicate::str::contains("length mismatch"));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    tower()
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .arg("--no-prompt")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("What happened"));
}

#[test]
fn missing_keys_are_all_reported() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, r#"{ "measurement": "rhok", "tags": {} }"#);
    tower()
        .arg("--config")
        .arg(&cfg)
        .arg("--no-prompt")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("db, arduino, water_level, light_sensor"));
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "{ not json");
    let out = tower()
        .arg("--config")
        .arg(&cfg)
        .args(["--no-prompt", "--json"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let last = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "ConfigInvalid");
}

#[test]
fn check_prints_summary_without_devices() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, CONFIG);
    tower()
        .arg("--config")
        .arg(&cfg)
        .args(["--no-prompt", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config ok"))
        .stdout(predicate::str::contains("fields (9)"));
}

#[test]
fn unknown_serial_port_is_device_unavailable() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, CONFIG);
    tower()
        .arg("--config")
        .arg(&cfg)
        .args(["--no-prompt", "--dry-run"])
        .assert()
        .code(3);
}

#[test]
fn unreachable_database_is_reported() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, CONFIG);
    let capture = write_capture(&dir);
    tower()
        .arg("--config")
        .arg(&cfg)
        .arg("--no-prompt")
        .arg("--replay")
        .arg(&capture)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("database"));
}

/// Replays an empty capture so the session ends right after startup.
fn quiet_session(dir: &TempDir, cfg: &Path, stdin: &str) -> assert_cmd::assert::Assert {
    let empty = dir.path().join("empty.txt");
    fs::write(&empty, "").unwrap();
    tower()
        .arg("--config")
        .arg(cfg)
        .arg("--replay")
        .arg(&empty)
        .arg("--dry-run")
        .write_stdin(stdin)
        .assert()
}

#[test]
fn declining_the_prompt_leaves_config_untouched() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, CONFIG);
    quiet_session(&dir, &cfg, "n\n").success();
    assert_eq!(fs::read_to_string(&cfg).unwrap(), CONFIG);
}

#[test]
fn accepted_edit_is_saved() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, CONFIG);
    quiet_session(&dir, &cfg, "y\ntank\n")
        .success()
        .stderr(predicate::str::contains("Enter configuration mode?"));
    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cfg).unwrap()).unwrap();
    assert_eq!(saved["measurement"], "tank");
    assert_eq!(saved["db"]["ssl"], false);
}

#[test]
fn check_never_prompts_or_rewrites_config() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, CONFIG);
    tower()
        .arg("--config")
        .arg(&cfg)
        .arg("--check")
        .write_stdin("y\ntank\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("measurement: rhok"))
        .stderr(predicate::str::contains("Enter configuration mode?").not());
    assert_eq!(fs::read_to_string(&cfg).unwrap(), CONFIG);
}
