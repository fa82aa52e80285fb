//! Binary-level tests for `tictac`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn tictac(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("tictac").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn decode_prints_board() {
    let dir = tempdir().unwrap();
    tictac(dir.path())
        .args(["decode", r#"[null,null,null,null,"X",null,null,null,null]"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(" X "))
        .stdout(predicate::str::contains("1 of 9 cells filled"));
}

#[test]
fn decode_rejects_malformed_payload() {
    let dir = tempdir().unwrap();
    tictac(dir.path())
        .args(["decode", "[null,null]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed payload"));
}

#[test]
fn demo_plays_default_script_to_a_draw() {
    let dir = tempdir().unwrap();
    tictac(dir.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: draw"));
}

#[test]
fn demo_accepts_custom_moves() {
    let dir = tempdir().unwrap();
    tictac(dir.path())
        .args(["demo", "--room", "room1", "--moves", "0,3,1,4,2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: X wins"));
}

#[test]
fn config_file_is_honoured() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("tictac.toml"),
        "username = \"alice\"\nroom = \"from_config\"\n",
    )
    .unwrap();

    tictac(dir.path())
        .args(["demo", "--moves", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice#1"));
}

#[test]
fn unreadable_config_fails() {
    let dir = tempdir().unwrap();
    tictac(dir.path())
        .args(["--config", "missing.toml", "decode", "[]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
