// jctlfmt - app/rules_mgr.rs
//
// Manages loading of rule sets from both built-in sources (embedded in the
// binary) and user-defined TOML files on disk.
// User rule sets override built-in rule sets with the same ID.

use crate::core::rules::{self, RuleSet};
use crate::util::constants;
use crate::util::error::RuleError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Load all available rule sets: built-in first, then user-defined overrides.
///
/// Invalid user files are logged and skipped (non-fatal).
/// Returns the merged list and any non-fatal errors encountered.
pub fn load_all_rule_sets(user_rules_dir: Option<&Path>) -> (Vec<RuleSet>, Vec<RuleError>) {
    let mut rule_sets = rules::load_builtin_rule_sets();
    let mut errors = Vec::new();

    tracing::debug!(builtin_count = rule_sets.len(), "Loaded built-in rule sets");

    if let Some(dir) = user_rules_dir {
        if dir.is_dir() {
            let (user_sets, user_errors) = load_user_rule_sets(dir);
            errors.extend(user_errors);

            for user_set in user_sets {
                if let Some(pos) = rule_sets.iter().position(|r| r.id == user_set.id) {
                    tracing::info!(rule_set = %user_set.id, "User rule set overrides built-in");
                    rule_sets[pos] = user_set;
                } else {
                    tracing::debug!(rule_set = %user_set.id, "Loaded user-defined rule set");
                    rule_sets.push(user_set);
                }
            }
        } else {
            tracing::debug!(
                dir = %dir.display(),
                "User rule-set directory does not exist (skipping)"
            );
        }
    }

    if rule_sets.len() > constants::MAX_RULE_SETS {
        tracing::warn!(
            count = rule_sets.len(),
            max = constants::MAX_RULE_SETS,
            "Too many rule sets loaded, truncating"
        );
        errors.push(RuleError::TooManyRuleSets {
            count: rule_sets.len(),
            max: constants::MAX_RULE_SETS,
        });
        rule_sets.truncate(constants::MAX_RULE_SETS);
    }

    (rule_sets, errors)
}

/// Find a rule set by id.
pub fn find<'a>(rule_sets: &'a [RuleSet], id: &str) -> Option<&'a RuleSet> {
    rule_sets.iter().find(|r| r.id == id)
}

/// Load user-defined rule sets from a directory, in file-name order.
fn load_user_rule_sets(dir: &Path) -> (Vec<RuleSet>, Vec<RuleError>) {
    let mut rule_sets = Vec::new();
    let mut errors = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(RuleError::Io {
                path: dir.to_path_buf(),
                source: e,
            });
            return (rule_sets, errors);
        }
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry_result in entries {
        match entry_result {
            Ok(entry) => {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                    paths.push(path);
                }
            }
            Err(e) => errors.push(RuleError::Io {
                path: dir.to_path_buf(),
                source: e,
            }),
        }
    }
    paths.sort();

    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    for path in paths {
        match load_rule_set_file(&path) {
            Ok(rule_set) => {
                if let Some(first) = seen.get(&rule_set.id) {
                    errors.push(RuleError::DuplicateId {
                        id: rule_set.id.clone(),
                        path1: first.clone(),
                        path2: path,
                    });
                    continue;
                }
                seen.insert(rule_set.id.clone(), path);
                rule_sets.push(rule_set);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid rule set");
                errors.push(e);
            }
        }
    }

    (rule_sets, errors)
}

/// Read, size-check, parse, and compile a single rule-set file.
pub fn load_rule_set_file(path: &Path) -> Result<RuleSet, RuleError> {
    let metadata = std::fs::metadata(path).map_err(|e| RuleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.len() > constants::MAX_RULE_FILE_SIZE {
        return Err(RuleError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_RULE_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| RuleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    rules::parse_rule_set_toml(&content, path)
        .and_then(|def| rules::validate_and_compile(def, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const USER_EXAMPLE: &str = r#"
[rule_set]
id = "example"
name = "Overridden"

[defaults]
action = "full"
"#;

    #[test]
    fn test_builtin_only_when_no_dir() {
        let (sets, errors) = load_all_rule_sets(None);
        assert!(errors.is_empty());
        assert!(find(&sets, "example").is_some_and(|r| r.is_builtin));
    }

    #[test]
    fn test_missing_dir_is_not_an_error() {
        let (sets, errors) = load_all_rule_sets(Some(Path::new("/nonexistent/jctlfmt-rules")));
        assert!(errors.is_empty());
        assert!(!sets.is_empty());
    }

    #[test]
    fn test_user_override_and_addition() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.toml"), USER_EXAMPLE).unwrap();
        fs::write(
            dir.path().join("b.toml"),
            "[rule_set]\nid = \"mine\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (sets, errors) = load_all_rule_sets(Some(dir.path()));
        assert!(errors.is_empty(), "{errors:?}");
        let example = find(&sets, "example").unwrap();
        assert!(!example.is_builtin);
        assert_eq!(example.name, "Overridden");
        assert!(find(&sets, "mine").is_some());
    }

    #[test]
    fn test_invalid_and_duplicate_files_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.toml"), "[rule_set]\nid = \"dup\"\n").unwrap();
        fs::write(dir.path().join("2.toml"), "[rule_set]\nid = \"dup\"\n").unwrap();
        fs::write(dir.path().join("3.toml"), "this is not toml [").unwrap();

        let (sets, errors) = load_all_rule_sets(Some(dir.path()));
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .any(|e| matches!(e, RuleError::DuplicateId { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, RuleError::TomlParse { .. })));
        assert_eq!(sets.iter().filter(|r| r.id == "dup").count(), 1);
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.toml");
        let padding = "#".repeat(constants::MAX_RULE_FILE_SIZE as usize + 1);
        fs::write(&path, format!("[rule_set]\nid = \"big\"\n{padding}\n")).unwrap();
        assert!(matches!(
            load_rule_set_file(&path),
            Err(RuleError::FileTooLarge { .. })
        ));
    }
}
