#![cfg(unix)]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

#[test]
fn run_loads_default_dotenv_file() {
    let dir = make_temp_dir();
    write_file(&dir.path().join(".env"), "DOTENV_LINES_CLI_DEFAULT=from_default\n");

    let output = run_dotenv(
        dir.path(),
        &["run", "--", "printenv", "DOTENV_LINES_CLI_DEFAULT"],
        None,
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "from_default");
}

#[test]
fn run_passes_multiline_values() {
    let dir = make_temp_dir();
    write_file(
        &dir.path().join(".env"),
        "DOTENV_LINES_CLI_MULTI=\"first\nsecond\"\n",
    );

    let output = run_dotenv(
        dir.path(),
        &["run", "printenv", "DOTENV_LINES_CLI_MULTI"],
        None,
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "first\nsecond");
}

#[test]
fn run_uses_last_file_precedence_for_selected_files() {
    let dir = make_temp_dir();
    write_file(&dir.path().join(".env.base"), "DOTENV_LINES_CLI_PRECEDENCE=base\n");
    write_file(&dir.path().join(".env.local"), "DOTENV_LINES_CLI_PRECEDENCE=local\n");

    let output = run_dotenv(
        dir.path(),
        &[
            "run",
            "-f",
            ".env.base,.env.local",
            "--",
            "printenv",
            "DOTENV_LINES_CLI_PRECEDENCE",
        ],
        None,
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "local");
}

#[test]
fn run_override_flag_controls_existing_environment_precedence() {
    let dir = make_temp_dir();
    write_file(&dir.path().join(".env"), "DOTENV_LINES_CLI_OVERRIDE=from_file\n");

    let without_override = run_dotenv(
        dir.path(),
        &["run", "--", "printenv", "DOTENV_LINES_CLI_OVERRIDE"],
        Some(("DOTENV_LINES_CLI_OVERRIDE", "from_env")),
    );
    assert_success(&without_override);
    assert_eq!(stdout_trimmed(&without_override), "from_env");

    let with_override = run_dotenv(
        dir.path(),
        &["run", "-o", "--", "printenv", "DOTENV_LINES_CLI_OVERRIDE"],
        Some(("DOTENV_LINES_CLI_OVERRIDE", "from_env")),
    );
    assert_success(&with_override);
    assert_eq!(stdout_trimmed(&with_override), "from_file");
}

#[test]
fn run_expand_resolves_inherited_variables() {
    let dir = make_temp_dir();
    write_file(
        &dir.path().join(".env"),
        "DOTENV_LINES_CLI_EXPANDED=${DOTENV_LINES_CLI_BASE}/bin\n",
    );

    let output = run_dotenv(
        dir.path(),
        &["run", "--expand", "--", "printenv", "DOTENV_LINES_CLI_EXPANDED"],
        Some(("DOTENV_LINES_CLI_BASE", "/opt/app")),
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "/opt/app/bin");
}

#[test]
fn run_ignore_missing_skips_missing_selected_files() {
    let dir = make_temp_dir();
    write_file(&dir.path().join(".env.real"), "DOTENV_LINES_CLI_IGNORE=loaded\n");

    let output = run_dotenv(
        dir.path(),
        &[
            "run",
            "--ignore-missing",
            "-f",
            "missing.env,.env.real",
            "--",
            "printenv",
            "DOTENV_LINES_CLI_IGNORE",
        ],
        None,
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "loaded");
}

#[test]
fn run_without_ignore_missing_fails_when_selected_file_is_missing() {
    let dir = make_temp_dir();

    let output = run_dotenv(
        dir.path(),
        &["run", "-f", "missing.env", "--", "printenv", "HOME"],
        None,
    );

    assert!(!output.status.success(), "expected missing file to fail");
    assert!(stderr_text(&output).contains("missing.env"));
}

#[test]
fn run_reports_parse_errors_with_fragment() {
    let dir = make_temp_dir();
    write_file(&dir.path().join(".env"), "OK=1\nFOO=bar baz\n");

    let output = run_dotenv(dir.path(), &["run", "--", "printenv", "OK"], None);

    assert!(!output.status.success(), "expected parse error to fail");
    let stderr = stderr_text(&output);
    assert!(
        stderr.contains("unexpected whitespace. Failed at [bar baz] (line 2 in .env)."),
        "unexpected stderr: {stderr:?}"
    );
}

#[test]
fn check_prints_entries_and_validates_required() {
    let dir = make_temp_dir();
    write_file(&dir.path().join(".env"), "A=1\nB=\"two\nlines\"\n");

    let ok = run_dotenv(dir.path(), &["check", "-r", "A,B"], None);
    assert_success(&ok);
    assert_eq!(stdout_trimmed(&ok), "A=\"1\"\nB=\"two\\nlines\"");

    let missing = run_dotenv(dir.path(), &["check", "--required", "C"], None);
    assert!(!missing.status.success(), "expected missing name to fail");
    assert!(stderr_text(&missing).contains("C is missing"));
}

fn run_dotenv(dir: &Path, args: &[&str], env_pair: Option<(&str, &str)>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_dotenv"));
    command.current_dir(dir).args(args);
    if let Some((key, value)) = env_pair {
        command.env(key, value);
    }
    command.output().expect("failed to run dotenv binary")
}

fn stdout_trimmed(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout)
        .trim_end()
        .to_string()
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success: stdout={:?}, stderr={:?}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn make_temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).expect("failed to write fixture file");
}
