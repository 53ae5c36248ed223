// jctlfmt - bin/jctldedup.rs
//
// Pass through journal JSON records whose `(unit) ident: <prio>msg` has
// not been seen before, unchanged. Login session scopes are treated as one
// unit. Typically run before jctlfmt to collapse repeated messages.

use clap::Parser;
use jctlfmt::app::stream::{self, MalformedPolicy};
use jctlfmt::util::{self, error::JctlfmtError};
use std::io::{self, BufWriter};

/// jctldedup - drop repeated journal records from `journalctl -o json` output.
#[derive(Parser, Debug)]
#[command(name = "jctldedup", version, about)]
struct Cli {
    /// Skip records that fail to parse instead of aborting.
    #[arg(long = "skip-malformed")]
    skip_malformed: bool,

    /// Enable debug logging on stderr (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    util::logging::init(cli.debug, None, None);

    let policy = if cli.skip_malformed {
        MalformedPolicy::Skip
    } else {
        MalformedPolicy::Abort
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match stream::run_dedup(stdin.lock(), &mut out, policy) {
        Ok(_) => {}
        Err(JctlfmtError::Io { ref source, .. }) if source.kind() == io::ErrorKind::BrokenPipe => {}
        Err(e) => {
            tracing::error!(error = %e, "jctldedup failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
