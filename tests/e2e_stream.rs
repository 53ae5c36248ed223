// jctlfmt - tests/e2e_stream.rs
//
// End-to-end tests for the parse -> format -> write pipeline through the
// library API, using the on-disk fixtures. No mocks: real parser, real
// formatters, real output encoding.

use jctlfmt::app::rules_mgr;
use jctlfmt::app::stream::{run_dedup, run_formatter, MalformedPolicy, StreamOptions};
use jctlfmt::core::export::OutputMode;
use jctlfmt::core::formatter::{DefaultFormatter, Engine, Formatter, Redaction, Rendering};
use jctlfmt::core::model::{Entry, Severity};
use jctlfmt::core::parser::parse_entry;
use jctlfmt::core::rules::RuleSet;
use jctlfmt::util::error::{JctlfmtError, ParseError};
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

const SPEC_RECORD: &str = r#"{"__REALTIME_TIMESTAMP":"1699999123000000","_HOSTNAME":"h","_SYSTEMD_UNIT":"x.service","SYSLOG_IDENTIFIER":"app","_PID":"42","PRIORITY":"7","MESSAGE":"hello"}"#;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture(name)).unwrap()
}

fn format_all<F: Formatter>(input: &str, formatter: F, redaction: Redaction, mode: OutputMode) -> String {
    let engine = Engine::new(formatter, redaction);
    let mut out = Vec::new();
    let options = StreamOptions {
        output_mode: mode,
        malformed: MalformedPolicy::Abort,
    };
    run_formatter(input.as_bytes(), &mut out, &engine, options).unwrap();
    String::from_utf8(out).unwrap()
}

fn format_one(line: &str, redaction: Redaction) -> Option<String> {
    Engine::new(DefaultFormatter, redaction).format(&parse_entry(line).unwrap())
}

fn all_flag_combinations() -> Vec<Redaction> {
    let mut out = Vec::new();
    for filtering in [true, false] {
        for sensitive in [true, false] {
            out.push(Redaction {
                filtering,
                sensitive,
            });
        }
    }
    out
}

fn example_rule_set() -> RuleSet {
    let (sets, errors) = rules_mgr::load_all_rule_sets(None);
    assert!(errors.is_empty());
    rules_mgr::find(&sets, "example").unwrap().clone()
}

/// Hand-written equivalent of the built-in `example` rule set, exercising
/// the trait extension point directly.
struct ExampleFormatter;

impl Formatter for ExampleFormatter {
    fn decide(&self, x: &Entry) -> Rendering {
        if x.str_uip() == "kernel" {
            if x.prio >= Severity::Info.value() {
                return Rendering::Filtered;
            } else if x.prio == Severity::Notice.value() && !x.msg.starts_with("Linux version ") {
                return Rendering::Filtered;
            }
            if x.str_pm().starts_with("<5>Linux version ") {
                return Rendering::custom_message("Linux version ...");
            }
        } else if x.str_ui() == "(myapp.service) myapp" {
            if x.prio >= Severity::Info.value() {
                return Rendering::Filtered;
            }
            return Rendering::NoPid;
        }
        Rendering::NoPidNoMessage
    }
}

// =============================================================================
// Reference record scenarios
// =============================================================================

#[test]
fn e2e_debug_record_suppressed_by_default() {
    assert_eq!(format_one(SPEC_RECORD, Redaction::default()), None);
}

#[test]
fn e2e_error_record_reduced_to_priority() {
    let line = SPEC_RECORD.replace("\"PRIORITY\":\"7\"", "\"PRIORITY\":\"3\"");
    let date = parse_entry(&line).unwrap().datetime_string();
    assert_eq!(
        format_one(&line, Redaction::default()).unwrap(),
        format!("{date} h (x.service) app: <3>")
    );
}

#[test]
fn e2e_filtering_disabled_shows_debug_reduced() {
    let date = parse_entry(SPEC_RECORD).unwrap().datetime_string();
    let redaction = Redaction {
        filtering: false,
        sensitive: true,
    };
    assert_eq!(
        format_one(SPEC_RECORD, redaction).unwrap(),
        format!("{date} h (x.service) app: <7>")
    );
}

#[test]
fn e2e_sensitivity_disabled_shows_full_form() {
    let line = SPEC_RECORD.replace("\"PRIORITY\":\"7\"", "\"PRIORITY\":\"3\"");
    let date = parse_entry(&line).unwrap().datetime_string();
    let redaction = Redaction {
        filtering: true,
        sensitive: false,
    };
    assert_eq!(
        format_one(&line, redaction).unwrap(),
        format!("{date} h (x.service) app[42]: <3>hello")
    );
}

#[test]
fn e2e_timestamp_truncation() {
    let line = SPEC_RECORD.replace("1699999123000000", "1699999123456789");
    assert_eq!(parse_entry(&line).unwrap().datetime.timestamp(), 1_699_999_123);
}

// =============================================================================
// Fixture pipeline
// =============================================================================

#[test]
fn e2e_fixture_default_counts() {
    let input = read_fixture("journal_sample.jsonl");
    let engine = Engine::new(DefaultFormatter, Redaction::default());
    let mut out = Vec::new();
    let summary = run_formatter(input.as_bytes(), &mut out, &engine, StreamOptions::default()).unwrap();
    assert_eq!(summary.lines_read, 10);
    assert_eq!(summary.records, 10);
    // Only the CRON debug record is filtered.
    assert_eq!(summary.suppressed, 1);
    assert_eq!(summary.written, 9);
}

#[test]
fn e2e_quoted_output_has_one_value_per_record() {
    let input = read_fixture("journal_sample.jsonl");
    let out = format_all(&input, DefaultFormatter, Redaction::default(), OutputMode::Quoted);
    let values: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(values.len(), 10);
    assert_eq!(values.iter().filter(|v| v.is_null()).count(), 1);
}

#[test]
fn e2e_rule_set_matches_hand_written_formatter() {
    let input = read_fixture("journal_sample.jsonl");
    let rule_set = example_rule_set();
    for redaction in all_flag_combinations() {
        for mode in [OutputMode::Plain, OutputMode::Quoted] {
            assert_eq!(
                format_all(&input, &rule_set, redaction, mode),
                format_all(&input, ExampleFormatter, redaction, mode),
                "{redaction:?} {mode:?}"
            );
        }
    }
}

#[test]
fn e2e_bytes_message_decoded_in_full_form() {
    let input = read_fixture("journal_sample.jsonl");
    let out = format_all(
        &input,
        DefaultFormatter,
        Redaction {
            filtering: false,
            sensitive: false,
        },
        OutputMode::Plain,
    );
    assert!(out
        .lines()
        .any(|l| l.ends_with("box (cron.service) CRON[2001]: <7>(root) CMD (run-parts)")));
}

#[test]
fn e2e_dedup_fixture() {
    let input = read_fixture("journal_sample.jsonl");
    let mut out = Vec::new();
    let summary = run_dedup(input.as_bytes(), &mut out, MalformedPolicy::Abort).unwrap();
    assert_eq!(summary.written, 9);
    assert_eq!(String::from_utf8(out).unwrap(), read_fixture("golden/dedup.jsonl"));
}

// =============================================================================
// Malformed input policy
// =============================================================================

#[test]
fn e2e_malformed_abort() {
    let input = read_fixture("malformed.jsonl");
    let engine = Engine::new(DefaultFormatter, Redaction::default());
    let mut out = Vec::new();
    let err = run_formatter(input.as_bytes(), &mut out, &engine, StreamOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        JctlfmtError::Parse {
            line_number: 2,
            source: ParseError::Decode { .. }
        }
    ));
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[test]
fn e2e_malformed_skip() {
    let input = read_fixture("malformed.jsonl");
    let engine = Engine::new(DefaultFormatter, Redaction::default());
    let mut out = Vec::new();
    let options = StreamOptions {
        malformed: MalformedPolicy::Skip,
        ..Default::default()
    };
    let summary = run_formatter(input.as_bytes(), &mut out, &engine, options).unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.written, 2);
}
