// jctlfmt - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "jctlfmt";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "jctlfmt";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log level when neither RUST_LOG, --debug nor config set one.
/// Kept at `warn` because stdout carries the formatted records and stderr
/// should stay quiet during normal pipeline use.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Config file name, resolved relative to the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the user rule-set directory under the platform config directory.
pub const RULES_DIR_NAME: &str = "rules";

// =============================================================================
// Journal export field names
// =============================================================================

/// Timestamp assigned by the originating client, preferred when present.
pub const FIELD_SOURCE_REALTIME_TIMESTAMP: &str = "_SOURCE_REALTIME_TIMESTAMP";

/// Timestamp assigned by journald on reception.
pub const FIELD_REALTIME_TIMESTAMP: &str = "__REALTIME_TIMESTAMP";

pub const FIELD_HOSTNAME: &str = "_HOSTNAME";
pub const FIELD_SYSTEMD_UNIT: &str = "_SYSTEMD_UNIT";
pub const FIELD_SYSLOG_IDENTIFIER: &str = "SYSLOG_IDENTIFIER";
pub const FIELD_PID: &str = "_PID";
pub const FIELD_PRIORITY: &str = "PRIORITY";
pub const FIELD_MESSAGE: &str = "MESSAGE";

// =============================================================================
// Record model
// =============================================================================

/// Priority recorded when the PRIORITY field is absent.
pub const UNKNOWN_PRIORITY: i64 = -1;

/// Number of trailing decimal digits holding the sub-second part of a
/// journal timestamp (microsecond resolution).
pub const TIMESTAMP_SUBSECOND_DIGITS: usize = 6;

/// chrono format used to render `Entry::datetime`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder message used by `Rendering::unknown()`.
pub const UNKNOWN_MESSAGE_PLACEHOLDER: &str = "???";

// =============================================================================
// Deduplication
// =============================================================================

/// Pattern for login session scope units whose numeric id is collapsed
/// when computing deduplication keys.
pub const SESSION_SCOPE_PATTERN: &str = r"^session-[0-9]+\.scope$";

/// Canonical unit substituted for any session scope in deduplication keys.
pub const SESSION_SCOPE_CANONICAL: &str = "session-123.scope";

// =============================================================================
// Rule-set limits
// =============================================================================

/// Maximum number of rule sets that can be loaded (built-in + user).
pub const MAX_RULE_SETS: usize = 100;

/// Maximum number of rules in a single rule set.
pub const MAX_RULES_PER_SET: usize = 1_000;

/// Maximum size of a rule-set TOML file in bytes.
pub const MAX_RULE_FILE_SIZE: u64 = 64 * 1024; // 64 KB

/// Maximum regex pattern length to prevent ReDoS.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;
