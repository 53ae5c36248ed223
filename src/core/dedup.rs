// jctlfmt - core/dedup.rs
//
// First-occurrence filter over journal entries.
// Holds its own set of seen keys; the formatting core stays stateless.

use crate::core::model::Entry;
use crate::util::constants;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn session_scope_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(constants::SESSION_SCOPE_PATTERN).expect("session scope pattern is valid")
    })
}

/// Deduplication key for an entry: `str_ui: str_pm`, with every login
/// session scope collapsed onto one canonical unit so that the same
/// message from different sessions counts once.
pub fn dedup_key(x: &Entry) -> String {
    if session_scope_regex().is_match(&x.unit) {
        format!(
            "({}) {}: {}",
            constants::SESSION_SCOPE_CANONICAL,
            x.ident,
            x.str_pm()
        )
    } else {
        format!("{}: {}", x.str_ui(), x.str_pm())
    }
}

/// Remembers the keys of entries seen so far.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time an entry's key is observed.
    pub fn observe(&mut self, x: &Entry) -> bool {
        self.seen.insert(dedup_key(x))
    }

    /// Number of distinct keys seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn entry(unit: &str, ident: &str, pid: &str, prio: i64, msg: &str) -> Entry {
        Entry {
            datetime: Local.timestamp_opt(1_699_999_123, 0).unwrap(),
            hostname: "h".to_string(),
            unit: unit.to_string(),
            ident: ident.to_string(),
            pid: pid.to_string(),
            prio,
            msg: msg.to_string(),
        }
    }

    #[test]
    fn test_session_scopes_collapse() {
        let a = entry("session-1.scope", "sudo", "10", 5, "opened");
        let b = entry("session-4711.scope", "sudo", "99", 5, "opened");
        assert_eq!(dedup_key(&a), "(session-123.scope) sudo: <5>opened");
        assert_eq!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn test_non_matching_scope_kept_verbatim() {
        let e = entry("session-x.scope", "sudo", "", 5, "opened");
        assert_eq!(dedup_key(&e), "(session-x.scope) sudo: <5>opened");
        let e = entry("user-session-1.scope", "", "", 5, "m");
        assert_eq!(dedup_key(&e), "(user-session-1.scope): <5>m");
    }

    #[test]
    fn test_pid_and_time_do_not_affect_key() {
        let mut d = Deduplicator::new();
        assert!(d.observe(&entry("cron.service", "CRON", "1", 6, "run")));
        assert!(!d.observe(&entry("cron.service", "CRON", "2", 6, "run")));
        assert!(d.observe(&entry("cron.service", "CRON", "2", 5, "run")));
        assert_eq!(d.len(), 2);
    }
}
