// jctlfmt - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all jctlfmt operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum JctlfmtError {
    /// An input record could not be parsed.
    Parse {
        line_number: u64,
        source: ParseError,
    },

    /// Rule-set loading or validation failed.
    Rules(RuleError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// The requested rule set is not among the loaded ones.
    UnknownRuleSet { id: String },

    /// I/O error on the input or output stream.
    Io {
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for JctlfmtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse {
                line_number,
                source,
            } => write!(f, "Input line {line_number}: {source}"),
            Self::Rules(e) => write!(f, "Rule-set error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::UnknownRuleSet { id } => write!(
                f,
                "Unknown rule set '{id}'. Use --list-rules to see the available ids."
            ),
            Self::Io { operation, source } => write!(f, "I/O error during {operation}: {source}"),
        }
    }
}

impl std::error::Error for JctlfmtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::Rules(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::UnknownRuleSet { .. } => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Errors produced while turning one input line into an `Entry`.
#[derive(Debug)]
pub enum ParseError {
    /// The line is not valid UTF-8.
    InvalidUtf8 { source: std::string::FromUtf8Error },

    /// The line is not well-formed JSON.
    Decode { source: serde_json::Error },

    /// The line is valid JSON but not an object.
    NotAnObject,

    /// A required field is absent.
    MissingField { field: &'static str },

    /// A field is present but its value cannot be used.
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 { source } => write!(f, "record is not valid UTF-8: {source}"),
            Self::Decode { source } => write!(f, "malformed JSON record: {source}"),
            Self::NotAnObject => write!(f, "record is not a JSON object"),
            Self::MissingField { field } => write!(f, "missing required field '{field}'"),
            Self::InvalidField { field, reason } => {
                write!(f, "invalid value for field '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUtf8 { source } => Some(source),
            Self::Decode { source } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Rule-set errors
// ---------------------------------------------------------------------------

/// Errors related to rule-set loading and validation.
#[derive(Debug)]
pub enum RuleError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Rule-set file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A required field is missing or empty.
    MissingField {
        rule_set_id: String,
        field: &'static str,
    },

    /// A regex pattern in a rule is invalid.
    InvalidRegex {
        rule_set_id: String,
        rule_index: usize,
        pattern: String,
        source: regex::Error,
    },

    /// A regex pattern exceeds the maximum allowed length.
    RegexTooLong {
        rule_set_id: String,
        rule_index: usize,
        length: usize,
        max_length: usize,
    },

    /// A unit glob pattern is invalid.
    InvalidGlob {
        rule_set_id: String,
        rule_index: usize,
        pattern: String,
        source: glob::PatternError,
    },

    /// A rule is internally inconsistent.
    InvalidRule {
        rule_set_id: String,
        rule_index: usize,
        reason: String,
    },

    /// A rule set has more rules than allowed.
    TooManyRules {
        rule_set_id: String,
        count: usize,
        max: usize,
    },

    /// Two user rule sets share the same id.
    DuplicateId {
        id: String,
        path1: PathBuf,
        path2: PathBuf,
    },

    /// Maximum number of rule sets exceeded.
    TooManyRuleSets { count: usize, max: usize },

    /// I/O error reading a rule-set file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Rule set '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingField { rule_set_id, field } => {
                write!(f, "Rule set '{rule_set_id}': missing required field '{field}'")
            }
            Self::InvalidRegex {
                rule_set_id,
                rule_index,
                pattern,
                source,
            } => write!(
                f,
                "Rule set '{rule_set_id}' rule #{rule_index}: invalid regex '{pattern}': {source}"
            ),
            Self::RegexTooLong {
                rule_set_id,
                rule_index,
                length,
                max_length,
            } => write!(
                f,
                "Rule set '{rule_set_id}' rule #{rule_index}: regex is {length} chars, \
                 exceeds maximum of {max_length}"
            ),
            Self::InvalidGlob {
                rule_set_id,
                rule_index,
                pattern,
                source,
            } => write!(
                f,
                "Rule set '{rule_set_id}' rule #{rule_index}: invalid glob '{pattern}': {source}"
            ),
            Self::InvalidRule {
                rule_set_id,
                rule_index,
                reason,
            } => write!(f, "Rule set '{rule_set_id}' rule #{rule_index}: {reason}"),
            Self::TooManyRules {
                rule_set_id,
                count,
                max,
            } => write!(
                f,
                "Rule set '{rule_set_id}' has {count} rules, maximum is {max}"
            ),
            Self::DuplicateId { id, path1, path2 } => write!(
                f,
                "Duplicate rule-set ID '{id}' in '{}' and '{}'",
                path1.display(),
                path2.display()
            ),
            Self::TooManyRuleSets { count, max } => {
                write!(f, "Too many rule sets loaded ({count}), maximum is {max}")
            }
            Self::Io { path, source } => {
                write!(f, "I/O error reading rule set '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RuleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::InvalidGlob { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RuleError> for JctlfmtError {
    fn from(e: RuleError) -> Self {
        Self::Rules(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for JctlfmtError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for jctlfmt results.
pub type Result<T> = std::result::Result<T, JctlfmtError>;
