// jctlfmt - core/formatter.rs
//
// Formatting engine: turns an `Entry` into an optional output line.
//
// A `Formatter` makes a single per-entry decision (a `Rendering`); the
// `Redaction` flags then decide how much of that rendering survives.
// Core layer: pure logic, no I/O.

use crate::core::model::{Entry, Severity};
use crate::util::constants;
use std::borrow::Cow;

// =============================================================================
// Rendering decision
// =============================================================================

/// How much of an entry a formatter wants shown, from most to least detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    /// `datetime hostname str_uip: str_pm`
    Full,
    /// `datetime hostname str_ui: str_pm`
    NoPid,
    /// `datetime hostname str_ui: <prio>{text}`
    NoPidMessage(Cow<'static, str>),
    /// `datetime hostname str_ui: <prio>`
    NoPidNoMessage,
    /// Suppressed when filtering is enabled, otherwise `NoPidNoMessage`.
    Filtered,
}

impl Rendering {
    /// `NoPidMessage` with the `???` placeholder, for messages a formatter
    /// recognises as present but does not want to reveal.
    pub fn unknown() -> Self {
        Rendering::NoPidMessage(Cow::Borrowed(constants::UNKNOWN_MESSAGE_PLACEHOLDER))
    }

    /// `NoPidMessage` with a caller-supplied placeholder.
    pub fn custom_message(text: impl Into<Cow<'static, str>>) -> Self {
        Rendering::NoPidMessage(text.into())
    }
}

/// The single extension point: decide how an entry is rendered.
///
/// Implementations may consult any entry field or derived view. The base
/// policy is available as [`default_decision`].
pub trait Formatter {
    fn decide(&self, entry: &Entry) -> Rendering;
}

/// Base policy: debug-level entries are filtered, everything else keeps
/// only its priority.
pub fn default_decision(entry: &Entry) -> Rendering {
    if entry.prio == Severity::Debug.value() {
        Rendering::Filtered
    } else {
        Rendering::NoPidNoMessage
    }
}

/// Formatter that applies [`default_decision`] to every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl Formatter for DefaultFormatter {
    fn decide(&self, entry: &Entry) -> Rendering {
        default_decision(entry)
    }
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn decide(&self, entry: &Entry) -> Rendering {
        (**self).decide(entry)
    }
}

impl<F: Formatter + ?Sized> Formatter for &F {
    fn decide(&self, entry: &Entry) -> Rendering {
        (**self).decide(entry)
    }
}

// =============================================================================
// Redaction
// =============================================================================

/// The two redaction switches, fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redaction {
    /// Suppress `Filtered` entries entirely instead of reducing them.
    pub filtering: bool,
    /// Honour the reduced rendering levels. When false every rendering
    /// degrades to the full form.
    pub sensitive: bool,
}

impl Default for Redaction {
    fn default() -> Self {
        Self {
            filtering: true,
            sensitive: true,
        }
    }
}

impl Redaction {
    /// Full representation of the entry.
    pub fn full(&self, x: &Entry) -> String {
        format!(
            "{} {} {}: {}",
            x.datetime_string(),
            x.hostname,
            x.str_uip(),
            x.str_pm()
        )
    }

    /// Omits the pid in sensitive mode.
    pub fn no_pid(&self, x: &Entry) -> String {
        if !self.sensitive {
            return self.full(x);
        }
        format!(
            "{} {} {}: {}",
            x.datetime_string(),
            x.hostname,
            x.str_ui(),
            x.str_pm()
        )
    }

    /// Omits the pid and replaces the message with `msg` in sensitive mode.
    pub fn no_pid_message(&self, x: &Entry, msg: &str) -> String {
        if !self.sensitive {
            return self.full(x);
        }
        format!(
            "{} {} {}: <{}>{}",
            x.datetime_string(),
            x.hostname,
            x.str_ui(),
            x.prio,
            msg
        )
    }

    /// Omits the pid and the message in sensitive mode.
    pub fn no_pid_no_message(&self, x: &Entry) -> String {
        if !self.sensitive {
            return self.full(x);
        }
        format!(
            "{} {} {}: <{}>",
            x.datetime_string(),
            x.hostname,
            x.str_ui(),
            x.prio
        )
    }

    /// `None` when filtering is enabled, otherwise the pid- and
    /// message-less form.
    pub fn filtered(&self, x: &Entry) -> Option<String> {
        if self.filtering {
            return None;
        }
        Some(self.no_pid_no_message(x))
    }

    /// Apply a formatter's decision.
    pub fn render(&self, x: &Entry, rendering: &Rendering) -> Option<String> {
        match rendering {
            Rendering::Full => Some(self.full(x)),
            Rendering::NoPid => Some(self.no_pid(x)),
            Rendering::NoPidMessage(msg) => Some(self.no_pid_message(x, msg)),
            Rendering::NoPidNoMessage => Some(self.no_pid_no_message(x)),
            Rendering::Filtered => self.filtered(x),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// A formatter bound to a fixed set of redaction flags.
#[derive(Debug, Clone)]
pub struct Engine<F> {
    formatter: F,
    redaction: Redaction,
}

impl<F: Formatter> Engine<F> {
    pub fn new(formatter: F, redaction: Redaction) -> Self {
        Self {
            formatter,
            redaction,
        }
    }

    pub fn redaction(&self) -> Redaction {
        self.redaction
    }

    pub fn formatter(&self) -> &F {
        &self.formatter
    }

    /// Format one entry. `None` means the entry produces no output line.
    pub fn format(&self, entry: &Entry) -> Option<String> {
        let rendering = self.formatter.decide(entry);
        tracing::trace!(prio = entry.prio, ?rendering, "Formatter decision");
        self.redaction.render(entry, &rendering)
    }
}

// =============================================================================
// Tests
// =============================================================================
