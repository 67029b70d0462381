//! End-to-end checks of the `decant` binary surface.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_batch_flags() {
    Command::cargo_bin("decant")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--directory"))
        .stdout(predicate::str::contains("--limit"))
        .stdout(predicate::str::contains("--write"))
        .stdout(predicate::str::contains("--summary"));
}

#[test]
fn test_missing_directory_fails() {
    Command::cargo_bin("decant")
        .unwrap()
        .args(["--directory", "/nonexistent/invoices"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn test_empty_directory_is_a_clean_noop() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("decant")
        .unwrap()
        .args(["--directory", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No PDF invoices found"));
}

#[test]
fn test_default_directory_is_a_sibling_invoices_folder() {
    let root = tempfile::tempdir().unwrap();
    let work = root.path().join("work");
    std::fs::create_dir(&work).unwrap();
    std::fs::create_dir(root.path().join("invoices")).unwrap();

    // With no --directory, the sibling invoices folder is scanned;
    // it is empty, so the run is a clean no-op.
    Command::cargo_bin("decant")
        .unwrap()
        .current_dir(&work)
        .assert()
        .success()
        .stdout(predicate::str::contains("No PDF invoices found"));
}
