//! End-to-end tests for the `kclc` binary: `fmt` and `check` against real
//! files on disk, driven through `Command` exactly as a shell user would.

use std::path::PathBuf;
use std::process::Command;

fn kclc() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_kclc"))
}

#[test]
fn fmt_formats_a_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.kcl"), "let x=1").unwrap();

    let output = Command::new(kclc())
        .current_dir(&dir)
        .args(["fmt", "a.kcl"])
        .output()
        .expect("failed to run kclc fmt");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let contents = std::fs::read_to_string(dir.path().join("a.kcl")).unwrap();
    assert_eq!(contents, "let x = 1\n");
}

#[test]
fn fmt_already_formatted_file_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = "let x = 1\n";
    std::fs::write(dir.path().join("a.kcl"), canonical).unwrap();

    let output =
        Command::new(kclc()).current_dir(&dir).args(["fmt", "a.kcl"]).output().unwrap();

    assert!(output.status.success());
    assert_eq!(std::fs::read_to_string(dir.path().join("a.kcl")).unwrap(), canonical);
}

#[test]
fn fmt_check_exits_1_on_unformatted_input_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.kcl"), "let x=1").unwrap();

    let output =
        Command::new(kclc()).current_dir(&dir).args(["fmt", "--check", "a.kcl"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(std::fs::read_to_string(dir.path().join("a.kcl")).unwrap(), "let x=1");
}

#[test]
fn fmt_check_exits_0_on_formatted_input() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.kcl"), "let x = 1\n").unwrap();

    let output =
        Command::new(kclc()).current_dir(&dir).args(["fmt", "--check", "a.kcl"]).output().unwrap();

    assert!(output.status.success());
}

#[test]
fn fmt_glob_pattern_formats_every_matching_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.kcl"), "let x=1").unwrap();
    std::fs::write(dir.path().join("b.kcl"), "let y=2").unwrap();
    std::fs::write(dir.path().join("readme.txt"), "hello").unwrap();

    let output =
        Command::new(kclc()).current_dir(&dir).args(["fmt", "*.kcl"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(std::fs::read_to_string(dir.path().join("a.kcl")).unwrap(), "let x = 1\n");
    assert_eq!(std::fs::read_to_string(dir.path().join("b.kcl")).unwrap(), "let y = 2\n");
    assert_eq!(std::fs::read_to_string(dir.path().join("readme.txt")).unwrap(), "hello");
}

#[test]
fn fmt_reports_exit_1_on_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.kcl"), "let x = ").unwrap();

    let output = Command::new(kclc()).current_dir(&dir).args(["fmt", "bad.kcl"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn check_reports_no_errors_for_well_typed_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.kcl"), "let x = 1\n").unwrap();

    let output = Command::new(kclc()).current_dir(&dir).args(["check", "a.kcl"]).output().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn check_exits_1_when_a_file_fails_to_parse() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.kcl"), "let x = ").unwrap();

    let output = Command::new(kclc()).current_dir(&dir).args(["check", "bad.kcl"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn check_json_emits_one_based_line_and_column_for_each_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.kcl"), "let x = unknownFn()\n").unwrap();

    let output =
        Command::new(kclc()).current_dir(&dir).args(["check", "--json", "bad.kcl"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let reports: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let diagnostics = reports[0]["diagnostics"].as_array().unwrap();
    assert!(!diagnostics.is_empty());
    assert_eq!(diagnostics[0]["line"], 1);
    assert!(diagnostics[0]["column"].as_u64().unwrap() >= 1);
}

#[test]
fn lsp_help_exits_successfully() {
    let output = Command::new(kclc()).args(["lsp", "--help"]).output().unwrap();
    assert!(output.status.success());
}

#[test]
fn help_subcommand_prints_usage_and_exits_0() {
    let output = Command::new(kclc()).args(["help"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("USAGE"));
}
