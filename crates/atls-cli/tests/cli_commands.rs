//! Integration tests for the `atls` command line.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A project directory with a clean Makefile and an included rules file.
fn test_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Makefile"),
        "include rules.mk\n\n.PHONY: all clean\n\nall: app\n\napp: main.o\n\t$(CC) -o $@ $^\n\nclean:\n\trm -f app *.o\n",
    )
    .unwrap();
    fs::write(dir.path().join("rules.mk"), "CC ?= cc\n").unwrap();
    fs::write(dir.path().join("configure.ac"), "AC_INIT([app], [1.0])\nAC_OUTPUT\n").unwrap();
    dir
}

fn atls() -> Command {
    Command::cargo_bin("atls").unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_clean_makefile() {
    let dir = test_project();
    atls()
        .args(["check", "--color", "never", "Makefile", "rules.mk"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked 2 files, no problems"));
}

#[test]
fn check_reports_missing_include() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Makefile"), "include missing.mk\n").unwrap();

    atls()
        .args(["check", "--color", "never"])
        .arg(dir.path().join("Makefile"))
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("missing.mk: no such file")
                .and(predicate::str::contains("1 error, 0 warnings")),
        );
}

#[test]
fn check_reports_syntax_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.mk"), ": foo\nA = 1\nbroken\n").unwrap();

    atls()
        .args(["check", "--color", "never", "bad.mk"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("syntax error: missing token.")
                .and(predicate::str::contains("syntax error."))
                .and(predicate::str::contains("2 errors")),
        );
}

#[test]
fn check_warnings_do_not_fail() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Makefile"), "all: a\n\techo 1\nall: b\n\techo 2\n").unwrap();

    atls()
        .args(["check", "--color", "never", "Makefile"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(
            predicate::str::contains("all: is repeated on 3:1")
                .and(predicate::str::contains("1 warning")),
        );
}

#[test]
fn check_skips_configure_ac() {
    let dir = test_project();
    atls()
        .args(["check", "--color", "never", "configure.ac"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping"));
}

#[test]
fn check_fails_on_unreadable_file() {
    let dir = TempDir::new().unwrap();
    atls()
        .args(["check", "--color", "never", "nope.mk"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read nope.mk"));
}

#[test]
fn check_requires_files() {
    atls().arg("check").assert().failure();
}

// ---------------------------------------------------------------------------
// generate-schema
// ---------------------------------------------------------------------------

#[test]
fn generate_schema_for_make() {
    let output = atls()
        .args(["generate-schema", "make"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let schema: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
    assert!(schema["properties"]["subst"]["description"].is_string());
    assert!(schema["properties"].get("AC_INIT").is_none());
}

#[test]
fn generate_schema_for_config_with_indent() {
    atls()
        .args(["generate-schema", "config", "--indent", "4"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\n    \"$id\": \"urn:atls:schema:config\"")
                .and(predicate::str::contains("AC_INIT")),
        );
}

#[test]
fn generate_schema_from_artifact() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("docs.json");
    fs::write(&artifact, r#"{"make": {"only_this": "Documented."}}"#).unwrap();

    atls()
        .args(["generate-schema", "make", "--documentation"])
        .arg(&artifact)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("only_this").and(predicate::str::contains("subst").not()),
        );
}

#[test]
fn generate_schema_rejects_unknown_file_type() {
    atls()
        .args(["generate-schema", "cmake"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cmake"));
}

#[test]
fn generate_schema_fails_on_missing_artifact() {
    atls()
        .args(["generate-schema", "make", "--documentation", "/nonexistent/docs.json"])
        .assert()
        .failure();
}
