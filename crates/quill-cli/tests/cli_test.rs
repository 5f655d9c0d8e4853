//! E2E tests for the quill binary
//!
//! Each test runs the built binary inside an isolated working directory with
//! `HOME` pointed into the sandbox, so no global config leaks in.

use std::fs;
use std::process::{Command, Output};

use quill_config::testing::TestEnvironment;

/// Command for quill inside the test project root, with the caller's
/// QUILL_* and RUST_LOG settings scrubbed
fn quill_command(env: &TestEnvironment, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_quill"));
    cmd.args(args)
        .current_dir(&env.project_root)
        .env("HOME", env.path("home"))
        .env_remove("QUILL_LOG_FILE")
        .env_remove("QUILL_STRICT")
        .env_remove("QUILL_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to run quill inside the test project root
fn quill(env: &TestEnvironment, args: &[&str]) -> Output {
    quill_command(env, args)
        .output()
        .expect("Failed to execute quill")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Message part of a log line, after "[YYYY-MM-DD HH:MM:SS] "
fn messages(env: &TestEnvironment) -> Vec<String> {
    env.log_lines()
        .into_iter()
        .map(|line| {
            assert!(line.starts_with('['), "unexpected log line: {line}");
            line[22..].to_string()
        })
        .collect()
}

// ========== E2E: Write Workflow ==========

#[test]
fn e2e_write_report_example() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["out/report.txt", "Hello"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "[SUCCESS] File written: out/report.txt\n");
    assert_eq!(
        fs::read_to_string(env.path("out/report.txt")).unwrap(),
        "Hello"
    );
    assert_eq!(
        messages(&env),
        vec![
            "[INPUT] Writing to file: out/report.txt",
            "[SUCCESS] File written successfully: out/report.txt",
        ]
    );
}

#[test]
fn e2e_creates_nested_directories() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["a/b/c/file.txt", "deep"]);

    assert!(output.status.success());
    assert!(env.path("a/b/c").is_dir());
    assert_eq!(fs::read_to_string(env.path("a/b/c/file.txt")).unwrap(), "deep");
}

#[test]
fn e2e_bare_filename_in_working_directory() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["plain.txt", ""]);

    assert!(output.status.success());
    assert_eq!(fs::metadata(env.path("plain.txt")).unwrap().len(), 0);
}

#[test]
fn e2e_repeat_write_appends_log() {
    let env = TestEnvironment::new().unwrap();

    quill(&env, &["twice.txt", "same"]);
    quill(&env, &["twice.txt", "same"]);

    assert_eq!(fs::read_to_string(env.path("twice.txt")).unwrap(), "same");
    let logged = messages(&env);
    assert_eq!(logged.len(), 4);
    assert_eq!(
        logged.iter().filter(|m| m.starts_with("[SUCCESS] ")).count(),
        2
    );
}

#[test]
fn e2e_content_starting_with_hyphen() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["flags.txt", "-n"]);

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(env.path("flags.txt")).unwrap(), "-n");
}

#[test]
fn e2e_extra_arguments_are_ignored() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["extra.txt", "kept", "dropped"]);

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(env.path("extra.txt")).unwrap(), "kept");
    assert!(messages(&env).contains(&"[INFO] Ignored 1 extra argument(s)".to_string()));
}

#[test]
fn e2e_known_flags_after_path_are_written_as_content() {
    for flag in ["-v", "--verbose", "--strict", "-h", "--show-config"] {
        let env = TestEnvironment::new().unwrap();

        let output = quill(&env, &["notes.txt", flag]);

        assert_eq!(output.status.code(), Some(0), "flag {flag}");
        assert_eq!(stdout(&output), "[SUCCESS] File written: notes.txt\n");
        assert_eq!(fs::read_to_string(env.path("notes.txt")).unwrap(), flag);
        assert_eq!(
            messages(&env),
            vec![
                "[INPUT] Writing to file: notes.txt",
                "[SUCCESS] File written successfully: notes.txt",
            ]
        );
    }
}

#[test]
fn e2e_hyphen_leading_path() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["-dash.txt", "hi"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "[SUCCESS] File written: -dash.txt\n");
    assert_eq!(fs::read_to_string(env.path("-dash.txt")).unwrap(), "hi");
    assert_eq!(messages(&env)[0], "[INPUT] Writing to file: -dash.txt");
}

#[test]
fn e2e_options_before_path_still_apply() {
    let env = TestEnvironment::new().unwrap();
    env.create_dir("occupied").unwrap();

    let output = quill(&env, &["--strict", "occupied", "-v"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("[ERROR] Failed to write file occupied: "));
}

// ========== E2E: Usage Errors ==========

#[test]
fn e2e_no_arguments_is_usage_error() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &[]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "[ERROR] Usage: quill <file_path> <content>\n"
    );
    assert_eq!(
        messages(&env),
        vec!["[ERROR] Usage: quill <file_path> <content>"]
    );
}

#[test]
fn e2e_one_argument_is_usage_error_and_writes_nothing() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["lonely.txt"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!env.path("lonely.txt").exists());
    assert_eq!(messages(&env).len(), 1);
}

#[test]
fn e2e_rejected_command_line_is_usage_error() {
    let env = TestEnvironment::new().unwrap();

    // --log-file is missing its value
    let output = quill(&env, &["--log-file"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "[ERROR] Usage: quill <file_path> <content>\n"
    );
    assert_eq!(
        messages(&env),
        vec!["[ERROR] Usage: quill <file_path> <content>"]
    );
}

// ========== E2E: Write Failures ==========

#[cfg(unix)]
#[test]
fn e2e_unwritable_destination_still_exits_zero() {
    let env = TestEnvironment::new().unwrap();
    if env.create_read_only_dir("locked").unwrap().is_none() {
        eprintln!("skipping: permissions are not enforced for this user");
        return;
    }

    let output = quill(&env, &["locked/denied.txt", "nope"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with("[ERROR] Failed to write file locked/denied.txt: "));
    assert!(!env.path("locked/denied.txt").exists());
    let logged = messages(&env);
    assert_eq!(logged.len(), 2);
    assert!(logged[1].starts_with("[ERROR] Failed to write file locked/denied.txt: "));
}

#[test]
fn e2e_failed_write_exits_zero_by_default() {
    let env = TestEnvironment::new().unwrap();
    env.create_dir("occupied").unwrap();

    let output = quill(&env, &["occupied", "x"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with("[ERROR] Failed to write file occupied: "));
}

#[test]
fn e2e_strict_flag_exits_one_on_failure() {
    let env = TestEnvironment::new().unwrap();
    env.create_dir("occupied").unwrap();

    let output = quill(&env, &["--strict", "occupied", "x"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("[ERROR] "));
}

#[test]
fn e2e_strict_from_project_config() {
    let env = TestEnvironment::new().unwrap();
    env.write_project_config("[write]\nstrict = true\n").unwrap();
    env.create_dir("occupied").unwrap();

    let output = quill(&env, &["occupied", "x"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn e2e_strict_does_not_affect_success() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["--strict", "fine.txt", "ok"]);

    assert_eq!(output.status.code(), Some(0));
}

// ========== E2E: Configuration ==========

#[test]
fn e2e_log_file_flag_redirects_store() {
    let env = TestEnvironment::new().unwrap();

    let output = quill(&env, &["--log-file", "logs-elsewhere.log", "f.txt", "x"]);

    assert!(output.status.success());
    assert!(!env.log_path.exists());
    let custom = fs::read_to_string(env.path("logs-elsewhere.log")).unwrap();
    assert_eq!(custom.lines().count(), 2);
}

#[test]
fn e2e_log_file_from_environment() {
    let env = TestEnvironment::new().unwrap();

    let output = quill_command(&env, &["f.txt", "x"])
        .env("QUILL_LOG_FILE", "from-env.log")
        .output()
        .expect("Failed to execute quill");

    assert!(output.status.success());
    assert!(env.path("from-env.log").exists());
    assert!(!env.log_path.exists());
}

#[test]
fn e2e_show_config_outputs_toml() {
    let env = TestEnvironment::new().unwrap();
    env.write_project_config("[audit]\nlog_file = \"project.log\"\n")
        .unwrap();

    let output = quill(&env, &["--show-config"]);
    let out = stdout(&output);

    assert!(output.status.success());
    let parsed: Result<quill_config::Config, _> = toml::from_str(&out);
    let config = parsed.expect("show-config should print valid TOML");
    assert_eq!(config.audit.log_file, std::path::PathBuf::from("project.log"));
    assert!(!env.path("project.log").exists());
}

#[test]
fn e2e_malformed_config_aborts_before_writing() {
    let env = TestEnvironment::new().unwrap();
    env.write_project_config("[write\nstrict = ").unwrap();

    let output = quill(&env, &["never.txt", "x"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load configuration"));
    assert!(!env.path("never.txt").exists());
    assert!(!env.log_path.exists());
}
