//! Integration tests for `meow remove`

mod common;

use common::{lock_with_entry, TestProject};

const INTEGRITY: &str = "sha512-AAAA";

#[test]
fn test_remove_locked_package() {
    let project = TestProject::with_manifest("{}");
    project.create_file(
        "deps.neko",
        &lock_with_entry("left-pad", "1.0.0", "https://r.example/left-pad.tgz", INTEGRITY),
    );

    let output = project.run(None, &["remove", "left-pad"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Removed left-pad@1.0.0"));
    let lock = project.lock();
    assert!(lock["dependencies"]["left-pad"].is_null());
}

#[test]
fn test_remove_absent_package_leaves_file_unchanged() {
    let project = TestProject::with_manifest("{}");
    let content = lock_with_entry("left-pad", "1.0.0", "https://r.example/left-pad.tgz", INTEGRITY);
    project.create_file("deps.neko", &content);

    let output = project.run(None, &["remove", "chalk"]);

    assert!(output.status.success());
    assert_eq!(project.read_file("deps.neko"), content);
}

#[test]
fn test_remove_without_lock_file_does_not_create_one() {
    let project = TestProject::with_manifest("{}");

    let output = project.run(None, &["remove", "left-pad"]);

    assert!(output.status.success());
    assert!(!project.file_exists("deps.neko"));
}

#[test]
fn test_remove_dev_only_touches_dev_dependencies() {
    let project = TestProject::with_manifest("{}");
    project.create_file(
        "deps.neko",
        &lock_with_entry("left-pad", "1.0.0", "https://r.example/left-pad.tgz", INTEGRITY),
    );

    let output = project.run(None, &["remove", "--dev", "left-pad"]);

    assert!(output.status.success());
    let lock = project.lock();
    assert_eq!(
        lock["dependencies"]["left-pad"]["version"].as_str(),
        Some("1.0.0")
    );
}
