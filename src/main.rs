// jctlfmt - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Formatter selection (default policy or a rule set)
// 4. Running the stdin -> stdout stream driver

use clap::Parser;
use jctlfmt::app::{rules_mgr, stream};
use jctlfmt::core::export::OutputMode;
use jctlfmt::core::formatter::{DefaultFormatter, Engine, Formatter, Redaction};
use jctlfmt::platform::config::{self, AppConfig, PlatformPaths};
use jctlfmt::util::{self, error::JctlfmtError};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// jctlfmt - compact, redacted rendering of `journalctl -o json` output.
///
/// Reads one journal JSON record per line on stdin and writes one line per
/// record that survives filtering on stdout.
#[derive(Parser, Debug)]
#[command(name = "jctlfmt", version, about)]
struct Cli {
    /// Disable filtering: filtered records are shown without pid or message.
    #[arg(short = 'f', long = "no-filter")]
    no_filter: bool,

    /// Disable sensitive mode: every record is shown in full.
    #[arg(short = 's', long = "no-sensitive")]
    no_sensitive: bool,

    /// JSON output mode: one JSON string (or null) per input record.
    #[arg(short = 'j', long = "json-output")]
    json_output: bool,

    /// Rule set to format with instead of the default policy.
    #[arg(short = 'r', long = "rules", value_name = "ID")]
    rules: Option<String>,

    /// Directory containing user-defined rule sets.
    #[arg(long = "rules-dir", value_name = "DIR")]
    rules_dir: Option<PathBuf>,

    /// List the available rule sets and exit.
    #[arg(long = "list-rules")]
    list_rules: bool,

    /// Skip records that fail to parse instead of aborting.
    #[arg(long = "skip-malformed")]
    skip_malformed: bool,

    /// Configuration file (default: platform config directory).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    let paths = PlatformPaths::resolve();

    let (app_config, warnings) = match cli.config {
        Some(ref path) => match config::load_config_file(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => config::load_config(&paths.config_file()),
    };

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    tracing::debug!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "jctlfmt starting"
    );

    match run(&cli, &app_config, &paths) {
        Ok(()) => {}
        Err(JctlfmtError::Io { ref source, .. }) if source.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("Output closed by reader");
        }
        Err(e) => {
            tracing::error!(error = %e, "jctlfmt failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, app_config: &AppConfig, paths: &PlatformPaths) -> util::error::Result<()> {
    let rules_dir = cli
        .rules_dir
        .clone()
        .or_else(|| app_config.rules_dir.clone())
        .unwrap_or_else(|| paths.user_rules_dir.clone());
    let wanted = cli.rules.clone().or_else(|| app_config.rule_set.clone());

    if cli.list_rules {
        let (rule_sets, errors) = rules_mgr::load_all_rule_sets(Some(&rules_dir));
        for err in &errors {
            tracing::warn!(error = %err, "Rule-set loading warning");
        }
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for rs in &rule_sets {
            let origin = if rs.is_builtin { "built-in" } else { "user" };
            writeln!(out, "{}\t{}\t{}", rs.id, origin, rs.name).map_err(|source| {
                JctlfmtError::Io {
                    operation: "write rule-set list",
                    source,
                }
            })?;
        }
        return Ok(());
    }

    let formatter: Box<dyn Formatter> = match wanted {
        Some(id) => {
            let (rule_sets, errors) = rules_mgr::load_all_rule_sets(Some(&rules_dir));
            for err in &errors {
                tracing::warn!(error = %err, "Rule-set loading warning");
            }
            let rule_set = rules_mgr::find(&rule_sets, &id)
                .cloned()
                .ok_or(JctlfmtError::UnknownRuleSet { id })?;
            tracing::info!(rule_set = %rule_set.id, rules = rule_set.rules.len(), "Using rule set");
            Box::new(rule_set)
        }
        None => Box::new(DefaultFormatter),
    };

    let redaction = Redaction {
        filtering: app_config.filter && !cli.no_filter,
        sensitive: app_config.sensitive && !cli.no_sensitive,
    };
    let options = stream::StreamOptions {
        output_mode: if cli.json_output || app_config.json_output {
            OutputMode::Quoted
        } else {
            OutputMode::Plain
        },
        malformed: if cli.skip_malformed || app_config.skip_malformed {
            stream::MalformedPolicy::Skip
        } else {
            stream::MalformedPolicy::Abort
        },
    };
    tracing::debug!(?redaction, ?options, "Effective settings");

    let engine = Engine::new(formatter, redaction);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    stream::run_formatter(stdin.lock(), &mut out, &engine, options)?;
    Ok(())
}
