// jctlfmt - platform/config.rs
//
// Platform-specific path resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for jctlfmt configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/jctlfmt/)
    pub config_dir: PathBuf,

    /// User rule-set directory (e.g. ~/.config/jctlfmt/rules/)
    pub user_rules_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let user_rules_dir = config_dir.join(constants::RULES_DIR_NAME);
            Self {
                config_dir,
                user_rules_dir,
            }
        } else {
            let fallback = PathBuf::from(".");
            Self {
                user_rules_dir: fallback.join(constants::RULES_DIR_NAME),
                config_dir: fallback,
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub output: OutputSection,
    pub input: InputSection,
    pub rules: RulesSection,
    pub logging: LoggingSection,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Suppress filtered records (true) or show them reduced (false).
    pub filter: Option<bool>,
    /// Redact pids and messages.
    pub sensitive: Option<bool>,
    /// Write one JSON value per record instead of plain lines.
    pub json: Option<bool>,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Skip malformed records instead of aborting.
    pub skip_malformed: Option<bool>,
}

/// `[rules]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RulesSection {
    /// Rule-set id to use instead of the default formatter.
    pub rule_set: Option<String>,
    /// Additional rule-set directory.
    pub directory: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub filter: bool,
    pub sensitive: bool,
    pub json_output: bool,
    pub skip_malformed: bool,
    pub rule_set: Option<String>,
    pub rules_dir: Option<PathBuf>,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter: true,
            sensitive: true,
            json_output: false,
            skip_malformed: false,
            rule_set: None,
            rules_dir: None,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load config.toml from its default location.
///
/// Never fails: a missing file yields defaults silently, an unreadable or
/// unparseable one yields defaults plus a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        return (AppConfig::default(), Vec::new());
    }
    match load_config_file(config_path) {
        Ok(loaded) => loaded,
        Err(e) => (AppConfig::default(), vec![format!("{e}. Using defaults.")]),
    }
}

/// Load and validate an explicitly requested config file.
///
/// Returns the validated config and a list of non-fatal warnings about
/// values that were ignored.
pub fn load_config_file(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    Ok(validate(raw))
}

/// Validate each field, accumulating warnings for ignored values.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    if let Some(filter) = raw.output.filter {
        config.filter = filter;
    }
    if let Some(sensitive) = raw.output.sensitive {
        config.sensitive = sensitive;
    }
    if let Some(json) = raw.output.json {
        config.json_output = json;
    }
    if let Some(skip) = raw.input.skip_malformed {
        config.skip_malformed = skip;
    }

    if let Some(id) = raw.rules.rule_set {
        let id = id.trim();
        if id.is_empty() {
            warnings.push(
                "[rules] rule_set is empty. Using the default formatter.".to_string(),
            );
        } else {
            config.rule_set = Some(id.to_string());
        }
    }
    if let Some(dir) = raw.rules.directory {
        if !dir.is_empty() {
            config.rules_dir = Some(PathBuf::from(dir));
        }
    }

    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL
            ));
        }
    }
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file);
        }
    }

    (config, warnings)
}
