//! User configuration: built-in defaults, an optional TOML file and
//! `GRAPHEUS_*` environment overrides, in that order of precedence.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::commit::{CommitType, FormatterConfig, MessageFormatter, MessageStyle, ValidationConfig, Validator};
use crate::diff::{DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MAX_FILES, DiffProcessor};
use crate::error::ConfigError;
use crate::llm::{CommandExecutor, DEFAULT_REQUESTS_PER_MINUTE, DEFAULT_TIMEOUT_SECS, RateLimiter};
use crate::scope::{ScopeDetectionRule, ScopeDetector};

/// Project-local config file, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".grapheus.toml";

pub const ENV_MODEL_COMMAND: &str = "GRAPHEUS_MODEL_COMMAND";
pub const ENV_MODEL_TIMEOUT: &str = "GRAPHEUS_MODEL_TIMEOUT";
pub const ENV_MAX_FILES: &str = "GRAPHEUS_MAX_FILES";
pub const ENV_MAX_CHUNK_SIZE: &str = "GRAPHEUS_MAX_CHUNK_SIZE";
pub const ENV_MAX_SUBJECT_LENGTH: &str = "GRAPHEUS_MAX_SUBJECT_LENGTH";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model: ModelConfig,
    pub diff: DiffConfig,
    pub output: OutputConfig,
    pub validation: ValidationSettings,
    pub scope: ScopeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Program and leading arguments; the prompt is appended last.
    pub command: Vec<String>,
    pub timeout_secs: u64,
    pub requests_per_minute: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            command: vec!["claude".to_string(), "-p".to_string()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub max_chunk_size: usize,
    pub max_files: usize,
    /// Describe the index rather than the working directory.
    pub staged: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            max_files: DEFAULT_MAX_FILES,
            staged: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub style: MessageStyle,
    pub max_subject_length: usize,
    pub max_body_line_length: usize,
    pub auto_wrap_body: bool,
    pub break_on_sentence: bool,
    pub enforce_blank_line: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let formatter = FormatterConfig::default();
        Self {
            style: MessageStyle::default(),
            max_subject_length: formatter.max_subject_length,
            max_body_line_length: formatter.max_body_line_length,
            auto_wrap_body: formatter.auto_wrap_body,
            break_on_sentence: formatter.break_on_sentence,
            enforce_blank_line: formatter.enforce_blank_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub enforce_imperative: bool,
    pub enforce_capitalization: bool,
    pub allowed_types: Vec<String>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            enforce_imperative: true,
            enforce_capitalization: true,
            allowed_types: CommitType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
        }
    }
}

/// `[[scope.rules]]` entries, added on top of the built-in rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub rules: Vec<ScopeDetectionRule>,
}

impl Config {
    /// Load the first config file found from `working_dir`, apply environment
    /// overrides and validate the result.
    pub fn load(working_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = match find_config_file(working_dir) {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&text, &path.display().to_string())?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse TOML text. `origin` names the source in error messages.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Apply `GRAPHEUS_*` variables. Empty variables are ignored; numbers that
    /// fail to parse are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(command) = env::var(ENV_MODEL_COMMAND) {
            let parts: Vec<String> = command.split_whitespace().map(str::to_string).collect();
            if !parts.is_empty() {
                self.model.command = parts;
            }
        }
        if let Some(secs) = env_number(ENV_MODEL_TIMEOUT) {
            self.model.timeout_secs = secs;
        }
        if let Some(files) = env_number(ENV_MAX_FILES) {
            self.diff.max_files = files;
        }
        if let Some(size) = env_number(ENV_MAX_CHUNK_SIZE) {
            self.diff.max_chunk_size = size;
        }
        if let Some(len) = env_number(ENV_MAX_SUBJECT_LENGTH) {
            self.output.max_subject_length = len;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.command.first().is_none_or(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid("model.command must name a program".to_string()));
        }
        if self.model.requests_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "model.requests_per_minute must be greater than 0".to_string(),
            ));
        }
        if self.output.max_subject_length == 0 {
            return Err(ConfigError::Invalid(
                "output.max_subject_length must be greater than 0".to_string(),
            ));
        }
        if self.output.max_body_line_length == 0 {
            return Err(ConfigError::Invalid(
                "output.max_body_line_length must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn formatter_config(&self) -> FormatterConfig {
        FormatterConfig {
            max_subject_length: self.output.max_subject_length,
            max_body_line_length: self.output.max_body_line_length,
            auto_wrap_body: self.output.auto_wrap_body,
            break_on_sentence: self.output.break_on_sentence,
            enforce_blank_line: self.output.enforce_blank_line,
        }
    }

    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            max_subject_length: self.output.max_subject_length,
            max_body_line_length: self.output.max_body_line_length,
            enforce_imperative: self.validation.enforce_imperative,
            enforce_capitalization: self.validation.enforce_capitalization,
            allowed_types: self.validation.allowed_types.clone(),
        }
    }

    pub fn formatter(&self) -> MessageFormatter {
        MessageFormatter::new(self.formatter_config())
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.validation_config())
    }

    pub fn processor(&self) -> DiffProcessor {
        DiffProcessor::new(self.diff.max_chunk_size, self.diff.max_files)
    }

    /// Built-in scope rules plus the configured ones.
    pub fn scope_detector(&self) -> ScopeDetector {
        let mut detector = ScopeDetector::default();
        for rule in &self.scope.rules {
            detector.add_custom_rule(rule.clone());
        }
        detector
    }

    pub fn executor(&self) -> CommandExecutor {
        CommandExecutor::new(self.model.command.clone(), Duration::from_secs(self.model.timeout_secs))
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::per_minute(self.model.requests_per_minute)
    }
}

/// Candidate config files in lookup order.
pub fn config_file_candidates(working_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![working_dir.join(PROJECT_CONFIG_FILE)];
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        candidates.push(PathBuf::from(xdg).join("grapheus").join("config.toml"));
    }
    if let Ok(home) = env::var("HOME")
        && !home.is_empty()
    {
        candidates.push(PathBuf::from(home).join(".config").join("grapheus").join("config.toml"));
    }
    candidates
}

pub fn find_config_file(working_dir: &Path) -> Option<PathBuf> {
    config_file_candidates(working_dir).into_iter().find(|p| p.is_file())
}

fn env_number<T: FromStr>(name: &str) -> Option<T> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => match value.trim().parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!("Invalid {} value '{}', ignoring it", name, value);
                None
            }
        },
        _ => None,
    }
}
