// jctlfmt - app/stream.rs
//
// Stream driver: reads journal JSON lines, runs each record through the
// core, writes results. Strictly sequential, one record at a time, with a
// flush after every written record.
//
// The malformed-record policy lives here, not in the core: the parser
// reports every failure and this layer decides to abort or skip.

use crate::core::dedup::Deduplicator;
use crate::core::export::{self, OutputMode};
use crate::core::formatter::{Engine, Formatter};
use crate::core::model::Entry;
use crate::core::parser;
use crate::util::error::{JctlfmtError, ParseError, Result};
use std::io::{BufRead, Write};

/// What to do with a line that does not parse into an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Stop the run with an error at the first malformed line.
    #[default]
    Abort,
    /// Log a warning, count the line, and continue with the next one.
    Skip,
}

/// Driver options.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamOptions {
    pub output_mode: OutputMode,
    pub malformed: MalformedPolicy,
}

/// Counters for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Input lines consumed.
    pub lines_read: u64,
    /// Lines that parsed into entries.
    pub records: u64,
    /// Output records written.
    pub written: u64,
    /// Entries that produced no output.
    pub suppressed: u64,
    /// Malformed lines skipped under `MalformedPolicy::Skip`.
    pub skipped: u64,
}

/// Format every record from `input` onto `output`.
pub fn run_formatter<R, W, F>(
    input: R,
    output: &mut W,
    engine: &Engine<F>,
    options: StreamOptions,
) -> Result<StreamSummary>
where
    R: BufRead,
    W: Write,
    F: Formatter,
{
    let mut summary = StreamSummary::default();

    for_each_entry(input, options.malformed, &mut summary, |_raw, entry, summary| {
        let text = engine.format(entry);
        if text.is_none() {
            summary.suppressed += 1;
        }
        let written = export::write_result(output, options.output_mode, text.as_deref())
            .map_err(|source| JctlfmtError::Io {
                operation: "write output",
                source,
            })?;
        if written {
            summary.written += 1;
        }
        Ok(())
    })?;

    tracing::info!(
        lines = summary.lines_read,
        written = summary.written,
        suppressed = summary.suppressed,
        skipped = summary.skipped,
        "Formatting complete"
    );
    Ok(summary)
}

/// Copy each input line whose entry has not been seen before to `output`,
/// unchanged.
pub fn run_dedup<R, W>(
    input: R,
    output: &mut W,
    malformed: MalformedPolicy,
) -> Result<StreamSummary>
where
    R: BufRead,
    W: Write,
{
    let mut summary = StreamSummary::default();
    let mut dedup = Deduplicator::new();

    for_each_entry(input, malformed, &mut summary, |raw, entry, summary| {
        if !dedup.observe(entry) {
            summary.suppressed += 1;
            return Ok(());
        }
        output
            .write_all(raw.as_bytes())
            .and_then(|()| output.flush())
            .map_err(|source| JctlfmtError::Io {
                operation: "write output",
                source,
            })?;
        summary.written += 1;
        Ok(())
    })?;

    tracing::info!(
        lines = summary.lines_read,
        unique = dedup.len(),
        skipped = summary.skipped,
        "Deduplication complete"
    );
    Ok(summary)
}

/// Read `input` line by line, parse each line, and hand the raw line
/// (terminator included) and the entry to `handle`.
fn for_each_entry<R, H>(
    mut input: R,
    malformed: MalformedPolicy,
    summary: &mut StreamSummary,
    mut handle: H,
) -> Result<()>
where
    R: BufRead,
    H: FnMut(&str, &Entry, &mut StreamSummary) -> Result<()>,
{
    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        let n = input
            .read_until(b'\n', &mut buf)
            .map_err(|source| JctlfmtError::Io {
                operation: "read input",
                source,
            })?;
        if n == 0 {
            return Ok(());
        }
        summary.lines_read += 1;
        let line_number = summary.lines_read;

        let parsed = String::from_utf8(std::mem::take(&mut buf))
            .map_err(|source| ParseError::InvalidUtf8 { source })
            .and_then(|line| parser::parse_entry(&line).map(|entry| (line, entry)));
        let (line, entry) = match parsed {
            Ok(parsed) => parsed,
            Err(source) => match malformed {
                MalformedPolicy::Abort => {
                    tracing::error!(line = line_number, error = %source, "Malformed record; aborting");
                    return Err(JctlfmtError::Parse {
                        line_number,
                        source,
                    });
                }
                MalformedPolicy::Skip => {
                    tracing::warn!(line = line_number, error = %source, "Skipping malformed record");
                    summary.skipped += 1;
                    continue;
                }
            },
        };
        summary.records += 1;
        handle(&line, &entry, summary)?;
    }
}
