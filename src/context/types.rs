//! Signals derived from a diff and its history.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::git::CommitInfo;

/// A scalar lifted out of a config line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl ScalarValue {
    /// Type a raw config value: booleans, then integers, then floats, else text.
    /// Surrounding quotes and a trailing `,` or `;` are dropped.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_end_matches([',', ';']).trim();
        let unquoted = trimmed.trim_matches(|c| c == '"' || c == '\'');
        if unquoted.len() != trimmed.len() {
            return ScalarValue::Text(unquoted.to_string());
        }

        match unquoted {
            "true" => return ScalarValue::Bool(true),
            "false" => return ScalarValue::Bool(false),
            _ => {}
        }
        if let Ok(n) = unquoted.parse::<i64>() {
            return ScalarValue::Integer(n);
        }
        let numeric_start = unquoted
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.');
        if numeric_start
            && let Ok(f) = unquoted.parse::<f64>()
            && f.is_finite()
        {
            return ScalarValue::Float(f);
        }
        ScalarValue::Text(unquoted.to_string())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Integer(n) => write!(f, "{n}"),
            ScalarValue::Float(x) => write!(f, "{x}"),
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Text(s) => f.write_str(s),
        }
    }
}

/// A configuration parameter that changed value, appeared, or disappeared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigChange {
    pub file: String,
    pub parameter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<ScalarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<ScalarValue>,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionChangeType {
    Added,
    Removed,
    Modified,
}

impl FunctionChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionChangeType::Added => "added",
            FunctionChangeType::Removed => "removed",
            FunctionChangeType::Modified => "modified",
        }
    }
}

impl fmt::Display for FunctionChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionChange {
    pub file: String,
    pub function_name: String,
    pub change_type: FunctionChangeType,
    pub impact: String,
}

/// Named value in [`ChangeContext::change_patterns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Signal {
    Flag(bool),
    Count(usize),
    Histogram(BTreeMap<String, usize>),
}

/// Everything the analyzer learned about a change set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeContext {
    /// Newest first.
    pub recent_commits: Vec<CommitInfo>,
    pub related_commits: Vec<CommitInfo>,
    pub config_changes: Vec<ConfigChange>,
    pub function_changes: Vec<FunctionChange>,
    pub performance_hints: Vec<String>,
    pub change_patterns: BTreeMap<String, Signal>,
}

impl ChangeContext {
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.change_patterns.get(name), Some(Signal::Flag(true)))
    }

    pub fn count(&self, name: &str) -> Option<usize> {
        match self.change_patterns.get(name) {
            Some(Signal::Count(n)) => Some(*n),
            _ => None,
        }
    }
}
