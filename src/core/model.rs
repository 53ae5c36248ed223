// jctlfmt - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// =============================================================================
// Severity
// =============================================================================

/// Syslog priority levels, ordered from most to least severe.
///
/// The discriminants are the numeric values carried in the journal's
/// PRIORITY field. Ordering is plain integer ordering: a smaller value is
/// more severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(i64)]
pub enum Severity {
    Emerg = 0,
    Alert = 1,
    Crit = 2,
    Err = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    /// Returns all variants, most severe first.
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Emerg,
            Severity::Alert,
            Severity::Crit,
            Severity::Err,
            Severity::Warning,
            Severity::Notice,
            Severity::Info,
            Severity::Debug,
        ]
    }

    /// Numeric priority value.
    pub fn value(self) -> i64 {
        self as i64
    }

    /// Maps a numeric priority back to a level. Values outside 0..=7
    /// (including the -1 "unknown" sentinel) have no level.
    pub fn from_value(value: i64) -> Option<Severity> {
        Severity::all().iter().copied().find(|s| s.value() == value)
    }

    /// True when `self` is strictly more severe than `other`.
    pub fn is_more_severe_than(self, other: Severity) -> bool {
        self.value() < other.value()
    }

    /// syslog(3) keyword for the level.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Emerg => "emerg",
            Severity::Alert => "alert",
            Severity::Crit => "crit",
            Severity::Err => "err",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Entry (normalised output of parsing)
// =============================================================================

/// A single journal record, normalised for display.
///
/// Built once per input line by `core::parser::parse_entry` and never
/// mutated afterwards. The derived views (`str_ui`, `str_uip`, `str_pm`)
/// are computed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Local date and time, truncated to whole seconds.
    pub datetime: DateTime<Local>,

    /// Host that generated the record.
    pub hostname: String,

    /// systemd unit name, or empty.
    pub unit: String,

    /// Syslog identifier, or empty.
    pub ident: String,

    /// Process ID as it appeared in the record, or empty.
    pub pid: String,

    /// Numeric priority; `constants::UNKNOWN_PRIORITY` (-1) when absent.
    pub prio: i64,

    /// Message text with surrounding whitespace stripped.
    pub msg: String,
}

impl Entry {
    /// `datetime` rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn datetime_string(&self) -> String {
        self.datetime
            .format(constants::DATETIME_FORMAT)
            .to_string()
    }

    /// Returns `(unit) ident`, omitting the empty parts.
    pub fn str_ui(&self) -> String {
        if self.unit.is_empty() {
            self.ident.clone()
        } else if self.ident.is_empty() {
            format!("({})", self.unit)
        } else {
            format!("({}) {}", self.unit, self.ident)
        }
    }

    /// Returns `(unit) ident[pid]`, omitting the empty parts.
    pub fn str_uip(&self) -> String {
        if self.pid.is_empty() {
            self.str_ui()
        } else {
            format!("{}[{}]", self.str_ui(), self.pid)
        }
    }

    /// Returns `<prio>msg`, e.g. `<6>Hello world`.
    pub fn str_pm(&self) -> String {
        format!("<{}>{}", self.prio, self.msg)
    }

    /// Typed severity, or `None` for priorities outside the eight syslog
    /// levels (notably the -1 sentinel for a missing PRIORITY field).
    ///
    /// Raw comparisons on `prio` are deliberately left unadjusted: an
    /// unknown priority compares as more severe than `Emerg`, so threshold
    /// rules such as "prio >= info" never suppress it.
    pub fn severity(&self) -> Option<Severity> {
        Severity::from_value(self.prio)
    }
}

// =============================================================================
// Tests
// =============================================================================
