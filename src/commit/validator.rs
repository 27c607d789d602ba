//! Commit message validation.
//!
//! Findings are reported, never raised: a message is valid when it has no
//! errors, and warnings or suggestions never block a commit.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::formatter::capitalize_first;
use super::message::{CommitMessage, CommitType};

/// `type(scope)!: description`
static CONVENTIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)(\([^)]+\))?(!)?: (.+)$").expect("Invalid regex")
});

/// Past and progressive forms flagged as non-imperative, with their
/// imperative replacement.
const NON_IMPERATIVE: &[(&str, &str)] = &[
    ("added", "add"),
    ("adding", "add"),
    ("fixed", "fix"),
    ("fixing", "fix"),
    ("updated", "update"),
    ("updating", "update"),
    ("removed", "remove"),
    ("removing", "remove"),
    ("changed", "change"),
    ("changing", "change"),
    ("implemented", "implement"),
    ("implementing", "implement"),
    ("refactored", "refactor"),
    ("refactoring", "refactor"),
];

/// Phrases suggesting a subject describes more than one change.
const MULTIPLE_CHANGE_INDICATORS: &[&str] = &[
    " and ",
    " & ",
    ", ",
    " + ",
    " also ",
    " additionally ",
    " furthermore ",
    " moreover ",
    " besides ",
    " as well as ",
    " along with ",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SubjectLength,
    EmptySubject,
    InvalidType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    TrailingPeriod,
    Capitalization,
    ImperativeMood,
    BodyLineLength,
    BodySeparation,
    AtomicCommit,
    BreakingChangeFooter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    SubjectTruncation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// 1-based line in the full message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ValidationWarning {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
            line: None,
        }
    }

    fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSuggestion {
    pub kind: SuggestionKind,
    pub message: String,
    pub original: String,
    pub suggested: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<ValidationSuggestion>,
}

impl ValidationResult {
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn has_error(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    fn error(&mut self, kind: ErrorKind, message: String) {
        self.errors.push(ValidationError { kind, message });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_subject_length: usize,
    pub max_body_line_length: usize,
    pub enforce_imperative: bool,
    pub enforce_capitalization: bool,
    pub allowed_types: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_subject_length: 50,
            max_body_line_length: 72,
            enforce_imperative: true,
            enforce_capitalization: true,
            allowed_types: CommitType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Zero limits and an empty type list fall back to the defaults.
    pub fn new(mut config: ValidationConfig) -> Self {
        let defaults = ValidationConfig::default();
        if config.max_subject_length == 0 {
            config.max_subject_length = defaults.max_subject_length;
        }
        if config.max_body_line_length == 0 {
            config.max_body_line_length = defaults.max_body_line_length;
        }
        if config.allowed_types.is_empty() {
            config.allowed_types = defaults.allowed_types;
        }
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn validate(&self, message: &CommitMessage) -> ValidationResult {
        self.validate_text(&message.to_string())
    }

    /// Validate rendered commit text: the first line is the subject and
    /// everything after the first newline is the body.
    pub fn validate_text(&self, text: &str) -> ValidationResult {
        let (subject, body) = match text.split_once('\n') {
            Some((subject, body)) => (subject, Some(body)),
            None => (text, None),
        };

        let mut result = ValidationResult::default();
        self.validate_subject(subject, &mut result);
        if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
            self.validate_body(body, &mut result);
        }
        self.validate_conventional(subject, text, &mut result);
        validate_atomic(subject, &mut result);

        result.is_valid = result.errors.is_empty();
        result
    }

    fn validate_subject(&self, subject: &str, result: &mut ValidationResult) {
        let max = self.config.max_subject_length;
        let length = subject.chars().count();
        if length > max {
            result.error(
                ErrorKind::SubjectLength,
                format!("Subject line is {length} characters, should be {max} or fewer"),
            );
            result.suggestions.push(ValidationSuggestion {
                kind: SuggestionKind::SubjectTruncation,
                message: "Consider shortening the subject line".to_string(),
                original: subject.to_string(),
                suggested: truncate_subject(subject, max),
            });
        }

        if let Some(stripped) = subject.strip_suffix('.') {
            result.warnings.push(
                ValidationWarning::new(WarningKind::TrailingPeriod, "Remove trailing period from subject line")
                    .with_suggestion(stripped.to_string()),
            );
        }

        let (prefix, description) = split_header(subject);

        if self.config.enforce_capitalization
            && description
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() && !c.is_uppercase())
        {
            result.warnings.push(
                ValidationWarning::new(
                    WarningKind::Capitalization,
                    "Capitalize the first letter of the subject line",
                )
                .with_suggestion(format!("{prefix}{}", capitalize_first(description))),
            );
        }

        if self.config.enforce_imperative && !is_imperative(description) {
            result.warnings.push(
                ValidationWarning::new(
                    WarningKind::ImperativeMood,
                    "Use imperative mood (e.g., 'Fix bug' not 'Fixed bug')",
                )
                .with_suggestion(format!("{prefix}{}", suggest_imperative(description))),
            );
        }

        if subject.trim().is_empty() {
            result.error(ErrorKind::EmptySubject, "Subject line cannot be empty".to_string());
        }
    }

    fn validate_body(&self, body: &str, result: &mut ValidationResult) {
        let max = self.config.max_body_line_length;
        for (i, line) in body.lines().enumerate() {
            let length = line.chars().count();
            if line.trim().is_empty() || length <= max {
                continue;
            }
            // The subject is line 1 of the message.
            let number = i + 2;
            let mut warning = ValidationWarning::new(
                WarningKind::BodyLineLength,
                format!("Line {number} is {length} characters, should be {max} or fewer"),
            );
            warning.line = Some(number);
            result.warnings.push(warning);
        }

        if !body.starts_with('\n') {
            result.warnings.push(ValidationWarning::new(
                WarningKind::BodySeparation,
                "Add blank line between subject and body",
            ));
        }
    }

    fn validate_conventional(&self, subject: &str, text: &str, result: &mut ValidationResult) {
        let Some(caps) = CONVENTIONAL_RE.captures(subject) else {
            return;
        };

        let commit_type = &caps[1];
        if !self.config.allowed_types.iter().any(|t| t == commit_type) {
            result.error(
                ErrorKind::InvalidType,
                format!(
                    "Invalid commit type '{commit_type}'. Use: {}",
                    self.config.allowed_types.join(", ")
                ),
            );
        }

        if caps.get(3).is_some() && !text.contains("BREAKING CHANGE:") {
            result.warnings.push(ValidationWarning::new(
                WarningKind::BreakingChangeFooter,
                "Breaking changes should include 'BREAKING CHANGE:' footer",
            ));
        }
    }
}

fn validate_atomic(subject: &str, result: &mut ValidationResult) {
    let lower = subject.to_lowercase();
    if MULTIPLE_CHANGE_INDICATORS.iter().any(|i| lower.contains(i)) {
        result.warnings.push(ValidationWarning::new(
            WarningKind::AtomicCommit,
            "Consider splitting into multiple atomic commits",
        ));
    }
}

/// Split a subject into its conventional prefix (`type(scope)!: `) and the
/// description. Non-conventional subjects have an empty prefix.
fn split_header(subject: &str) -> (&str, &str) {
    match CONVENTIONAL_RE.captures(subject).and_then(|c| c.get(4)) {
        Some(description) => subject.split_at(description.start()),
        None => ("", subject),
    }
}

fn is_imperative(description: &str) -> bool {
    let lower = description.to_lowercase();
    !NON_IMPERATIVE.iter().any(|(form, _)| lower.starts_with(form))
}

/// Replace a non-imperative first word with its imperative form.
fn suggest_imperative(description: &str) -> String {
    let mut words = description.split_whitespace();
    let Some(first) = words.next() else {
        return description.to_string();
    };

    let lower = first.to_lowercase();
    match NON_IMPERATIVE.iter().find(|(form, _)| *form == lower) {
        Some((_, imperative)) => {
            let mut rewritten = vec![capitalize_first(imperative)];
            rewritten.extend(words.map(str::to_string));
            rewritten.join(" ")
        }
        None => description.to_string(),
    }
}

/// Whole words up to `max` characters; a first word that is already too long
/// is hard-cut with `...`.
fn truncate_subject(subject: &str, max: usize) -> String {
    let mut truncated = String::new();
    for word in subject.split_whitespace() {
        let extra = if truncated.is_empty() { 0 } else { 1 };
        if truncated.chars().count() + extra + word.chars().count() > max {
            break;
        }
        if extra == 1 {
            truncated.push(' ');
        }
        truncated.push_str(word);
    }

    if truncated.is_empty() {
        let kept: String = subject.chars().take(max.saturating_sub(3)).collect();
        return format!("{kept}...");
    }
    truncated
}
