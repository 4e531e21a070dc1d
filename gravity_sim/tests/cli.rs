use std::fs;
use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use common::{Decoded, Decoder};
use predicates::prelude::*;

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("gravity_cli_{}_{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

const TWO_BODIES: &str = "1 2\nSun 0 0 0 0 0 0 1e5 fixed\nPlanet 0 1 0 316.22776601683796 0 0 1\n";

#[test]
fn verlet_self_test_passes() {
    Command::cargo_bin("verlet")
        .unwrap()
        .arg("--test")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ok"));
}

#[test]
fn euler_self_test_passes() {
    Command::cargo_bin("euler")
        .unwrap()
        .arg("--test")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ok"));
}

#[test]
fn missing_input_prints_usage_and_exits_cleanly() {
    Command::cargo_bin("verlet")
        .unwrap()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn unknown_flag_prints_usage_and_exits_cleanly() {
    Command::cargo_bin("euler")
        .unwrap()
        .args(["--frobnicate", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn unreadable_input_fails_with_diagnostic() {
    Command::cargo_bin("verlet")
        .unwrap()
        .args(["--input", "/nonexistent/system.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/system.txt"));
}

#[test]
fn malformed_input_fails_without_output() {
    let path = scratch_file("short.txt", "1 3\nA 0 0 0 0 0 0 1\n");
    Command::cargo_bin("verlet")
        .unwrap()
        .args(["--input", path.to_str().unwrap()])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("expected 3 bodies"));
    fs::remove_file(path).ok();
}

#[test]
fn stream_decodes_header_declarations_and_frames() {
    let path = scratch_file("stream.txt", TWO_BODIES);
    let output = Command::cargo_bin("verlet")
        .unwrap()
        .args(["--input", path.to_str().unwrap(), "--dt", "0.001", "--T", "0.01"])
        .output()
        .unwrap();
    fs::remove_file(path).ok();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("t r0,0 r0,1 r0,2 v0,0"));
    assert_eq!(lines[1], "# Sun 1.000000e+05");
    assert_eq!(lines[2], "# Planet 1.000000e+00");
    // initial state plus one line per step
    assert_eq!(lines.len(), 3 + 11);

    let mut decoder = Decoder::new();
    let mut frames = 0;
    for line in &lines {
        if let Decoded::Frame(update) = decoder.feed(line) {
            assert!(update.complete);
            frames += 1;
        }
    }
    assert_eq!(frames, lines.len() - 3);
    let planet = &decoder.catalog()[1];
    assert!((planet.position.length() - 1.0).abs() < 0.1);
}

#[test]
fn presets_feed_the_engine() {
    let output = Command::cargo_bin("gravity_presets")
        .unwrap()
        .args(["saturn", "--per-ring", "3", "--seed", "11"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.starts_with("1 7\nSaturn "));
    let system = gravity_sim::input::parse(&text, 1e-7).unwrap();
    assert_eq!(system.len(), 7);
    assert_eq!(system.bodies[4].name, "BB0");
}
