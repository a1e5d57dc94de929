//! Integration tests for the genrunner binary.
//!
//! These drive the compiled binary end to end and pin down the exit-status
//! contract: 0 for success, 1 for runtime/plugin failures, 2 for
//! configuration errors (which must fire before any pipeline work).

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn genrunner(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_genrunner"))
        .args(args)
        .output()
        .expect("failed to spawn genrunner")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn version_prints_and_exits_zero() {
    let output = genrunner(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("genrunner v"));
}

#[test]
fn help_lists_general_options() {
    let output = genrunner(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("General options:"));
    assert!(text.contains("--max-instances"));
    assert!(text.contains("--coordination-key"));
}

#[test]
fn missing_generator_set_fails_with_one() {
    let output = genrunner(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--generator-set"));
}

#[test]
fn non_numeric_bound_exits_two() {
    let dir = TempDir::new().unwrap();
    let output = genrunner(&[
        "--max-instances=abc",
        "--coordination-key=pool",
        &format!("--coordination-dir={}", dir.path().display()),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Configuration error"));
    assert_no_segments(dir.path());
}

#[test]
fn zero_bound_exits_two_without_touching_shared_state() {
    let dir = TempDir::new().unwrap();
    let output = genrunner(&[
        "--max-instances=0",
        "--coordination-key=pool",
        &format!("--coordination-dir={}", dir.path().display()),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert_no_segments(dir.path());
}

#[test]
fn bound_above_platform_cap_exits_two() {
    let dir = TempDir::new().unwrap();
    let output = genrunner(&[
        "--max-instances=11",
        "--coordination-key=pool",
        &format!("--coordination-dir={}", dir.path().display()),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("[1, 10]"));
    assert_no_segments(dir.path());
}

#[test]
fn bound_without_key_exits_two() {
    let output = genrunner(&["--max-instances=2"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("coordination-key"));
}

#[test]
fn first_instance_is_admitted_and_creates_the_segment() {
    let dir = TempDir::new().unwrap();
    // The gate admits the creator immediately; the run then fails later on
    // the missing generator set (exit 1, not 2), proving the gate ran first
    // and let the process through.
    let output = genrunner(&[
        "--max-instances=1",
        "--coordination-key=pool",
        &format!("--coordination-dir={}", dir.path().display()),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--generator-set"));

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert!(names.iter().any(|n| n.ends_with(".slots")));
}

#[test]
fn too_many_positional_arguments_exit_two() {
    let output = genrunner(&["a.h", "t.xml", "extra"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Too many arguments"));
}

#[test]
fn project_file_supplies_coordinator_configuration() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project.txt");
    std::fs::write(
        &project,
        "[generator-project]\nmax-instances = 0\ncoordination-key = pool\n",
    )
    .unwrap();

    let output = genrunner(&[
        &format!("--project-file={}", project.display()),
        &format!("--coordination-dir={}", dir.path().display()),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn malformed_project_file_exits_two() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project.txt");
    std::fs::write(&project, "max-instances = 2\n").unwrap();

    let output = genrunner(&[&format!("--project-file={}", project.display())]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("[generator-project]"));
}

fn assert_no_segments(dir: &Path) {
    let segments = std::fs::read_dir(dir)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(".slots")
        })
        .count();
    assert_eq!(segments, 0, "configuration errors must not create segments");
}
