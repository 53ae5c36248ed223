// jctlfmt - core/export.rs
//
// Output encoding of formatting results.
// Core layer: writes to any Write trait object.

use serde::Serialize;
use std::io::{self, Write};

/// How formatting results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Rendered lines verbatim; suppressed entries produce nothing.
    #[default]
    Plain,
    /// One JSON value per input record: a string, or `null` when suppressed.
    Quoted,
}

/// Write one formatting result in the given mode and flush.
///
/// Returns true when something was written.
pub fn write_result<W: Write>(
    writer: &mut W,
    mode: OutputMode,
    result: Option<&str>,
) -> io::Result<bool> {
    match mode {
        OutputMode::Plain => match result {
            Some(line) => {
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            None => return Ok(false),
        },
        OutputMode::Quoted => {
            write_quoted(writer, &result)?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(true)
}

/// Serialise `value` as JSON with every character outside printable ASCII
/// escaped, so the output is 7-bit clean and one record per line.
pub fn write_quoted<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> io::Result<()> {
    let mut ser = serde_json::Serializer::with_formatter(&mut *writer, AsciiFormatter);
    value.serialize(&mut ser).map_err(io::Error::from)
}

/// `serde_json` formatter that escapes non-ASCII and DEL as `\uXXXX`
/// (UTF-16 surrogate pairs above the BMP), lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFormatter;

impl serde_json::ser::Formatter for AsciiFormatter {
    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if (' '..='~').contains(&c) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
