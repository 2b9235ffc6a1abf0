use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// A scratch workspace with its own data and config directories.
fn workspace() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("words.txt"),
        "i\nsaw\nthe\ncat\ndog\nran\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("chapter.txt"),
        "I saw teh cat.\nThe dog ran.\n",
    )
    .unwrap();
    dir
}

fn proofdesk(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("proofdesk").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env("PROOFDESK_DATA_DIR", dir.join("data"))
        .env("PROOFDESK_REVIEWER", "ann")
        .arg("--no-color");
    cmd
}

fn install_dictionary(dir: &Path) {
    proofdesk(dir)
        .args(["dict", "build", "en_GB", "words.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dictionary installed"));
}

#[test]
fn check_without_dictionary_fails() {
    let dir = workspace();
    proofdesk(dir.path())
        .args(["check", "chapter.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No dictionary installed for en_GB"));
}

#[test]
fn check_reports_exceptions_and_exit_code() {
    let dir = workspace();
    install_dictionary(dir.path());

    proofdesk(dir.path())
        .args(["check", "chapter.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "1:7 'teh' Not found in dictionaries [Not Reviewed]",
        ))
        .stdout(predicate::str::contains("1 exception found in 1 file"));

    proofdesk(dir.path())
        .args(["check", "--no-fail", "chapter.txt"])
        .assert()
        .success();
}

#[test]
fn check_json_output() {
    let dir = workspace();
    install_dictionary(dir.path());

    let output = proofdesk(dir.path())
        .args(["check", "-o", "json", "chapter.txt"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_exceptions"], 1);
    assert_eq!(json["exceptions"][0]["incorrect_word"], "teh");
    assert_eq!(json["exceptions"][0]["reason"], "NOT_IN_DICT");
    assert_eq!(json["exceptions"][0]["created_by"], "ann");
}

#[test]
fn project_dictionary_words_are_accepted() {
    let dir = workspace();
    install_dictionary(dir.path());

    proofdesk(dir.path())
        .args(["--project", "atlas", "dict", "add", "teh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added teh"));

    proofdesk(dir.path())
        .args(["--project", "atlas", "dict", "add", "teh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in the atlas project dictionary"));

    proofdesk(dir.path())
        .args(["--project", "atlas", "check", "chapter.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exceptions found"));

    let saved = fs::read_to_string(
        dir.path()
            .join("data/projects/atlas/project_dictionary.txt"),
    )
    .unwrap();
    assert!(saved.starts_with("Correct Word, Added By, Added At\n"));
    assert!(saved.contains("teh, ann, "));
}

#[test]
fn disabled_checks_are_respected() {
    let dir = workspace();
    install_dictionary(dir.path());
    fs::write(dir.path().join("spaced.txt"), "I saw  the cat.\n").unwrap();

    proofdesk(dir.path())
        .args(["check", "--disable", "auto-remove-blanks", "spaced.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Extra blank space"));

    proofdesk(dir.path())
        .args(["check", "spaced.txt"])
        .assert()
        .success();
}

#[test]
fn dict_list_shows_languages_and_projects() {
    let dir = workspace();
    install_dictionary(dir.path());
    proofdesk(dir.path())
        .args(["--project", "atlas", "dict", "add", "Frodo"])
        .assert()
        .success();

    proofdesk(dir.path())
        .args(["dict", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("en_GB"))
        .stdout(predicate::str::contains("6 words"))
        .stdout(predicate::str::contains("atlas"));
}

#[test]
fn completion_script_is_generated() {
    let dir = workspace();
    proofdesk(dir.path())
        .args(["--completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("proofdesk"));
}
