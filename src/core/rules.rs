// jctlfmt - core/rules.rs
//
// Declarative per-application formatters ("rule sets"), loading,
// validation, and evaluation.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::rules_mgr which feeds content here.

use crate::core::formatter::{default_decision, Formatter, Rendering};
use crate::core::model::Entry;
use crate::util::constants;
use crate::util::error::RuleError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML rule-set definition as deserialized from a .toml file.
/// This is validated and compiled into a `RuleSet` for runtime use.
#[derive(Debug, Deserialize)]
pub struct RuleSetDefinition {
    pub rule_set: RuleSetMeta,
    #[serde(default)]
    pub defaults: DefaultsDef,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
pub struct RuleSetMeta {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DefaultsDef {
    /// Action for entries no rule matches. Absent means the base policy.
    pub action: Option<ActionKind>,
    pub message: Option<String>,
}

/// One `[[rules]]` table. Every present criterion must hold.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub unit: Option<String>,
    pub unit_glob: Option<String>,
    pub ident: Option<String>,
    pub pid: Option<String>,
    pub str_ui: Option<String>,
    pub str_uip: Option<String>,
    pub prio: Option<i64>,
    pub min_prio: Option<i64>,
    pub max_prio: Option<i64>,
    pub message_regex: Option<String>,
    pub message_not_regex: Option<String>,
    pub action: ActionKind,
    pub message: Option<String>,
}

/// Action names accepted in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Full,
    NoPid,
    NoPidMessage,
    NoPidNoMessage,
    Unknown,
    Filtered,
}

// =============================================================================
// Runtime representation
// =============================================================================

/// Compiled match criteria for one rule.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub unit: Option<String>,
    pub unit_glob: Option<glob::Pattern>,
    pub ident: Option<String>,
    pub pid: Option<String>,
    pub str_ui: Option<String>,
    pub str_uip: Option<String>,
    pub prio: Option<i64>,
    pub min_prio: Option<i64>,
    pub max_prio: Option<i64>,
    pub message_regex: Option<Regex>,
    pub message_not_regex: Option<Regex>,
}

impl Criteria {
    /// True when every configured criterion holds for `x`.
    pub fn matches(&self, x: &Entry) -> bool {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref().map_or(true, |w| w == have)
        }

        if !eq(&self.unit, &x.unit) || !eq(&self.ident, &x.ident) || !eq(&self.pid, &x.pid) {
            return false;
        }
        if let Some(ref pattern) = self.unit_glob {
            if !pattern.matches(&x.unit) {
                return false;
            }
        }
        if self.prio.is_some_and(|p| x.prio != p)
            || self.min_prio.is_some_and(|p| x.prio < p)
            || self.max_prio.is_some_and(|p| x.prio > p)
        {
            return false;
        }
        if self.str_ui.is_some() && !eq(&self.str_ui, &x.str_ui()) {
            return false;
        }
        if self.str_uip.is_some() && !eq(&self.str_uip, &x.str_uip()) {
            return false;
        }
        if let Some(ref re) = self.message_regex {
            if !re.is_match(&x.msg) {
                return false;
            }
        }
        if let Some(ref re) = self.message_not_regex {
            if re.is_match(&x.msg) {
                return false;
            }
        }
        true
    }
}

/// A compiled rule: criteria plus the rendering to use on a match.
#[derive(Debug, Clone)]
pub struct Rule {
    pub criteria: Criteria,
    pub rendering: Rendering,
}

/// Runtime rule set after TOML parsing, validation and regex compilation.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rules: Vec<Rule>,
    /// Rendering for unmatched entries; `None` falls back to the base policy.
    pub default_rendering: Option<Rendering>,
    /// Whether this is a built-in rule set (true) or user-defined (false).
    pub is_builtin: bool,
}

impl Formatter for RuleSet {
    fn decide(&self, entry: &Entry) -> Rendering {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.criteria.matches(entry) {
                tracing::trace!(rule_set = %self.id, rule = index, "Rule matched");
                return rule.rendering.clone();
            }
        }
        match self.default_rendering {
            Some(ref rendering) => rendering.clone(),
            None => default_decision(entry),
        }
    }
}

// =============================================================================
// Validation and compilation
// =============================================================================

/// Parse a TOML string into a `RuleSetDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_rule_set_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<RuleSetDefinition, RuleError> {
    toml::from_str(toml_content).map_err(|e| RuleError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate a `RuleSetDefinition` and compile it into a runtime `RuleSet`.
pub fn validate_and_compile(
    def: RuleSetDefinition,
    is_builtin: bool,
) -> Result<RuleSet, RuleError> {
    let id = def.rule_set.id.trim().to_string();
    if id.is_empty() {
        return Err(RuleError::MissingField {
            rule_set_id: "(empty)".to_string(),
            field: "rule_set.id",
        });
    }

    if def.rules.len() > constants::MAX_RULES_PER_SET {
        return Err(RuleError::TooManyRules {
            rule_set_id: id,
            count: def.rules.len(),
            max: constants::MAX_RULES_PER_SET,
        });
    }

    // Index 0 is used for the [defaults] table in error messages.
    let default_rendering = match def.defaults.action {
        Some(kind) => Some(rendering_for(&id, 0, kind, def.defaults.message)?),
        None => None,
    };

    let mut rules = Vec::with_capacity(def.rules.len());
    for (i, rule) in def.rules.into_iter().enumerate() {
        rules.push(compile_rule(&id, i + 1, rule)?);
    }

    let name = if def.rule_set.name.is_empty() {
        id.clone()
    } else {
        def.rule_set.name
    };

    tracing::debug!(rule_set = %id, rules = rules.len(), "Compiled rule set");

    Ok(RuleSet {
        id,
        name,
        description: def.rule_set.description,
        rules,
        default_rendering,
        is_builtin,
    })
}

fn compile_rule(rule_set_id: &str, index: usize, def: RuleDef) -> Result<Rule, RuleError> {
    if let (Some(lo), Some(hi)) = (def.min_prio, def.max_prio) {
        if lo > hi {
            return Err(RuleError::InvalidRule {
                rule_set_id: rule_set_id.to_string(),
                rule_index: index,
                reason: format!("min_prio {lo} is greater than max_prio {hi}"),
            });
        }
    }

    let unit_glob = match def.unit_glob {
        Some(pattern) => Some(glob::Pattern::new(&pattern).map_err(|e| {
            RuleError::InvalidGlob {
                rule_set_id: rule_set_id.to_string(),
                rule_index: index,
                pattern: pattern.clone(),
                source: e,
            }
        })?),
        None => None,
    };

    let criteria = Criteria {
        unit: def.unit,
        unit_glob,
        ident: def.ident,
        pid: def.pid,
        str_ui: def.str_ui,
        str_uip: def.str_uip,
        prio: def.prio,
        min_prio: def.min_prio,
        max_prio: def.max_prio,
        message_regex: compile_optional_regex(rule_set_id, index, def.message_regex)?,
        message_not_regex: compile_optional_regex(rule_set_id, index, def.message_not_regex)?,
    };

    Ok(Rule {
        criteria,
        rendering: rendering_for(rule_set_id, index, def.action, def.message)?,
    })
}

fn rendering_for(
    rule_set_id: &str,
    index: usize,
    kind: ActionKind,
    message: Option<String>,
) -> Result<Rendering, RuleError> {
    Ok(match kind {
        ActionKind::Full => Rendering::Full,
        ActionKind::NoPid => Rendering::NoPid,
        ActionKind::NoPidNoMessage => Rendering::NoPidNoMessage,
        ActionKind::Unknown => Rendering::unknown(),
        ActionKind::Filtered => Rendering::Filtered,
        ActionKind::NoPidMessage => match message {
            Some(text) => Rendering::custom_message(text),
            None => {
                return Err(RuleError::InvalidRule {
                    rule_set_id: rule_set_id.to_string(),
                    rule_index: index,
                    reason: "action 'no-pid-message' requires a 'message'".to_string(),
                })
            }
        },
    })
}

/// Compile a regex pattern with length validation to prevent ReDoS.
fn compile_optional_regex(
    rule_set_id: &str,
    index: usize,
    pattern: Option<String>,
) -> Result<Option<Regex>, RuleError> {
    let Some(pattern) = pattern else {
        return Ok(None);
    };
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(RuleError::RegexTooLong {
            rule_set_id: rule_set_id.to_string(),
            rule_index: index,
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| RuleError::InvalidRegex {
            rule_set_id: rule_set_id.to_string(),
            rule_index: index,
            pattern,
            source: e,
        })
}

// =============================================================================
// Built-in rule sets (embedded at compile time)
// =============================================================================

/// Embedded TOML content for built-in rule sets: (filename, TOML content).
pub fn builtin_rule_set_sources() -> Vec<(&'static str, &'static str)> {
    vec![("example.toml", include_str!("../../rules/example.toml"))]
}

/// Load and validate all built-in rule sets.
///
/// Invalid rule sets are logged and skipped (non-fatal).
pub fn load_builtin_rule_sets() -> Vec<RuleSet> {
    let mut rule_sets = Vec::new();

    for (filename, content) in builtin_rule_set_sources() {
        let path = Path::new("<builtin>").join(filename);
        match parse_rule_set_toml(content, &path).and_then(|def| validate_and_compile(def, true)) {
            Ok(rule_set) => {
                tracing::debug!(rule_set = %rule_set.id, "Loaded built-in rule set");
                rule_sets.push(rule_set);
            }
            Err(e) => {
                tracing::error!(file = filename, error = %e, "Failed to load built-in rule set");
            }
        }
    }

    rule_sets
}

// =============================================================================
// Tests
// =============================================================================
