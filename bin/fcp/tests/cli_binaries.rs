use assert_cmd::prelude::*;
use std::process::{Command, Output};

fn binary_output(args: &[&str]) -> Output {
    #[allow(deprecated)]
    let mut command = Command::cargo_bin("fcp").expect("failed to locate fcp binary");
    command.args(args);
    command.output().expect("failed to run fcp")
}

#[test]
fn help_lists_usage() {
    let output = binary_output(&["--help"]);
    assert!(output.status.success(), "fcp --help should succeed");
    assert!(output.stderr.is_empty(), "help output should not write to stderr");
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert!(stdout.contains("Usage"));
}

#[test]
fn without_operands_shows_usage_and_fails() {
    let output = binary_output(&[]);
    assert!(!output.status.success(), "running fcp without operands should fail");
    let stderr = String::from_utf8(output.stderr).expect("stderr is UTF-8");
    assert!(!stderr.is_empty());
}

#[test]
fn rejects_unknown_flag() {
    let output = binary_output(&["--definitely-not-a-flag"]);
    assert!(!output.status.success(), "unrecognised flags should return a failure exit status");
}
