// jctlfmt - tests/e2e_cli.rs
//
// End-to-end tests for the jctlfmt and jctldedup binaries: real process,
// real stdin/stdout, compared byte-for-byte against golden output.
//
// TZ is pinned to UTC so rendered dates are stable across machines, and an
// empty config file is passed so the user's own config.toml cannot leak in.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn golden(name: &str) -> String {
    std::fs::read_to_string(fixture("golden").join(name)).unwrap()
}

fn run(bin: &str, args: &[&str], config_dir: &Path, stdin: &[u8]) -> Output {
    let config = config_dir.join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "").unwrap();
    }
    let mut cmd = Command::new(bin);
    if bin == env!("CARGO_BIN_EXE_jctlfmt") {
        cmd.arg("--config")
            .arg(&config)
            .arg("--rules-dir")
            .arg(config_dir.join("rules"));
    }
    let mut child = cmd
        .args(args)
        .env("TZ", "UTC")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

fn jctlfmt(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().unwrap();
    let input = std::fs::read(fixture("journal_sample.jsonl")).unwrap();
    run(env!("CARGO_BIN_EXE_jctlfmt"), args, dir.path(), &input)
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "exit {:?}, stderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn cli_default_policy() {
    assert_eq!(stdout(&jctlfmt(&[])), golden("default.txt"));
}

#[test]
fn cli_no_filter() {
    assert_eq!(stdout(&jctlfmt(&["-f"])), golden("default_no_filter.txt"));
    assert_eq!(stdout(&jctlfmt(&["--no-filter"])), golden("default_no_filter.txt"));
}

#[test]
fn cli_no_sensitive() {
    assert_eq!(stdout(&jctlfmt(&["-s"])), golden("default_no_sensitive.txt"));
}

#[test]
fn cli_json_output() {
    assert_eq!(stdout(&jctlfmt(&["-j"])), golden("default_json.txt"));
}

#[test]
fn cli_example_rule_set() {
    assert_eq!(stdout(&jctlfmt(&["-r", "example"])), golden("example.txt"));
    assert_eq!(
        stdout(&jctlfmt(&["-r", "example", "-f"])),
        golden("example_no_filter.txt")
    );
    assert_eq!(
        stdout(&jctlfmt(&["--rules", "example", "-j"])),
        golden("example_json.txt")
    );
    assert_eq!(
        stdout(&jctlfmt(&["-r", "example", "-f", "-s"])),
        golden("example_no_filter_no_sensitive.txt")
    );
}

#[test]
fn cli_json_escapes_non_ascii() {
    let dir = tempfile::tempdir().unwrap();
    let input = "{\"__REALTIME_TIMESTAMP\":\"1699999123000000\",\"_HOSTNAME\":\"h\",\"MESSAGE\":\"café 🦀\"}\n";
    let out = run(
        env!("CARGO_BIN_EXE_jctlfmt"),
        &["-j", "-s"],
        dir.path(),
        input.as_bytes(),
    );
    assert_eq!(
        stdout(&out),
        "\"2023-11-14 21:58:43 h : <-1>caf\\u00e9 \\ud83e\\udd80\"\n"
    );
}

#[test]
fn cli_unknown_rule_set_fails() {
    let out = jctlfmt(&["-r", "does-not-exist"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("does-not-exist"));
}

#[test]
fn cli_list_rules_includes_user_sets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("rules")).unwrap();
    std::fs::write(
        dir.path().join("rules").join("mine.toml"),
        "[rule_set]\nid = \"mine\"\nname = \"Mine\"\n",
    )
    .unwrap();
    let out = run(
        env!("CARGO_BIN_EXE_jctlfmt"),
        &["--list-rules"],
        dir.path(),
        b"",
    );
    let listing = stdout(&out);
    assert!(listing.contains("example\tbuilt-in\t"));
    assert!(listing.contains("mine\tuser\tMine"));
}

#[test]
fn cli_config_file_sets_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[output]\nfilter = false\n\n[rules]\nrule_set = \"example\"\n",
    )
    .unwrap();
    let input = std::fs::read(fixture("journal_sample.jsonl")).unwrap();
    let out = run(env!("CARGO_BIN_EXE_jctlfmt"), &[], dir.path(), &input);
    assert_eq!(stdout(&out), golden("example_no_filter.txt"));
}

#[test]
fn cli_malformed_aborts_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    let input = std::fs::read(fixture("malformed.jsonl")).unwrap();

    let out = run(env!("CARGO_BIN_EXE_jctlfmt"), &[], dir.path(), &input);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "2023-11-14 21:58:43 h app: <3>\n"
    );
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 2"));

    let out = run(
        env!("CARGO_BIN_EXE_jctlfmt"),
        &["--skip-malformed"],
        dir.path(),
        &input,
    );
    assert_eq!(
        stdout(&out),
        "2023-11-14 21:58:43 h app: <3>\n2023-11-14 21:58:44 h app: <3>\n"
    );
}

#[test]
fn cli_dedup() {
    let dir = tempfile::tempdir().unwrap();
    let input = std::fs::read(fixture("journal_sample.jsonl")).unwrap();
    let out = run(env!("CARGO_BIN_EXE_jctldedup"), &[], dir.path(), &input);
    assert_eq!(stdout(&out), golden("dedup.jsonl"));
}

#[test]
fn cli_skip_malformed_covers_invalid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let mut input = std::fs::read(fixture("malformed.jsonl")).unwrap();
    input.extend_from_slice(b"{\"MESSAGE\":\"\xff\"}\n");

    let out = run(
        env!("CARGO_BIN_EXE_jctlfmt"),
        &["--skip-malformed"],
        dir.path(),
        &input,
    );
    assert_eq!(
        stdout(&out),
        "2023-11-14 21:58:43 h app: <3>\n2023-11-14 21:58:44 h app: <3>\n"
    );
}
