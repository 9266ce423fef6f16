//! Command-line tests covering paths that fail before any media tool runs

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vidpare(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vidpare").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("VIDPARE_CONFIG")
        .env_remove("VIDPARE_ACCURACY")
        .env_remove("VIDPARE_LOG_LEVEL")
        .env_remove("VIDPARE_LOG_FORMAT")
        .env_remove("VIDPARE_CRF");
    cmd
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    vidpare(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("vidpare v", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_help_lists_options() {
    let dir = TempDir::new().unwrap();
    vidpare(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--accuracy"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--overwrite"));
}

#[test]
fn test_missing_input_is_unreadable() {
    let dir = TempDir::new().unwrap();
    vidpare(&dir)
        .args(["missing.mp4", "out.mp4", "--start", "2", "--end", "7"])
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot read media resource"));
    assert!(!dir.path().join("out.mp4").exists());
}

#[test]
fn test_directory_input_is_unreadable() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("clips")).unwrap();
    vidpare(&dir)
        .args(["clips", "out.mp4"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not a regular file"));
}

#[test]
fn test_missing_probe_tool_is_unreadable() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.mp4"), b"not really a video").unwrap();
    vidpare(&dir)
        .env("VIDPARE_FFPROBE_PATH", "vidpare-missing-ffprobe")
        .args(["in.mp4", "out.mp4", "--end", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("vidpare-missing-ffprobe"));
    assert!(!dir.path().join("out.mp4").exists());
}

#[test]
fn test_invalid_time_is_usage_error() {
    let dir = TempDir::new().unwrap();
    vidpare(&dir)
        .args(["in.mp4", "out.mp4", "--start", "1:75"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must be less than 60"));
}

#[test]
fn test_invalid_accuracy_is_usage_error() {
    let dir = TempDir::new().unwrap();
    vidpare(&dir)
        .args(["in.mp4", "out.mp4", "--accuracy", "fast"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_output_is_usage_error() {
    let dir = TempDir::new().unwrap();
    vidpare(&dir).arg("in.mp4").assert().code(2);
}

#[test]
fn test_bad_config_file_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("vidpare.toml"), "[trim]\nspeed = 3\n").unwrap();
    vidpare(&dir)
        .args(["in.mp4", "out.mp4"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    vidpare(&dir)
        .args(["in.mp4", "out.mp4", "--config", "absent.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn test_invalid_crf_override_fails() {
    let dir = TempDir::new().unwrap();
    vidpare(&dir)
        .env("VIDPARE_CRF", "99")
        .args(["in.mp4", "out.mp4"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ffmpeg.crf"));
}
