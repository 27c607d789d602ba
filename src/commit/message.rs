//! Commit message model and parsing of free-text model answers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::llm::strip_code_fences;

/// Footer lines start with one of these and contain a colon.
const FOOTER_KEYWORDS: &[&str] = &["BREAKING CHANGE", "Closes", "Fixes", "Refs"];

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
    Revert,
}

impl CommitType {
    pub const ALL: [CommitType; 11] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Style,
        CommitType::Refactor,
        CommitType::Perf,
        CommitType::Test,
        CommitType::Build,
        CommitType::Ci,
        CommitType::Chore,
        CommitType::Revert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Chore => "chore",
            CommitType::Revert => "revert",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        CommitType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("unknown commit type '{s}'"))
    }
}

/// How the model is asked to phrase the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStyle {
    #[default]
    Conventional,
    Simple,
    Detailed,
}

impl MessageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStyle::Conventional => "conventional",
            MessageStyle::Simple => "simple",
            MessageStyle::Detailed => "detailed",
        }
    }
}

impl fmt::Display for MessageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conventional" => Ok(MessageStyle::Conventional),
            "simple" => Ok(MessageStyle::Simple),
            "detailed" => Ok(MessageStyle::Detailed),
            _ => Err(format!(
                "unknown message style '{s}'. Use: conventional, simple, detailed"
            )),
        }
    }
}

/// A structured commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMessage {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub description: String,
    pub body: Option<String>,
    pub footer: Option<String>,
    pub breaking: bool,
}

impl CommitMessage {
    pub fn new(commit_type: CommitType, description: impl Into<String>) -> Self {
        Self {
            commit_type,
            scope: None,
            description: description.into(),
            body: None,
            footer: None,
            breaking: false,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// `type(scope)!: ` with the parts that are present.
    pub fn header_prefix(&self) -> String {
        let mut prefix = self.commit_type.as_str().to_string();
        if let Some(scope) = self.scope.as_deref().filter(|s| !s.is_empty()) {
            prefix.push('(');
            prefix.push_str(scope);
            prefix.push(')');
        }
        if self.breaking {
            prefix.push('!');
        }
        prefix.push_str(": ");
        prefix
    }

    pub fn subject(&self) -> String {
        format!("{}{}", self.header_prefix(), self.description)
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.subject())?;
        for section in [&self.body, &self.footer].into_iter().flatten() {
            if !section.is_empty() {
                write!(f, "\n\n{section}")?;
            }
        }
        Ok(())
    }
}

/// Split a model answer into subject, body and footer.
///
/// The first line is the subject. Later non-blank lines form the body until
/// the first footer line; everything after that is footer.
pub fn parse_model_response(response: &str, style: MessageStyle) -> Result<CommitMessage, ModelError> {
    let text = strip_code_fences(response);
    let mut lines = text.lines();
    let subject = lines.next().map(str::trim).unwrap_or_default();
    if subject.is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    let mut message = match style {
        MessageStyle::Conventional => parse_subject(subject),
        MessageStyle::Simple | MessageStyle::Detailed => CommitMessage::new(CommitType::Chore, subject),
    };

    let mut body = Vec::new();
    let mut footer = Vec::new();
    for line in lines.map(str::trim).filter(|l| !l.is_empty()) {
        if footer.is_empty() && is_footer_line(line) {
            footer.push(line);
        } else if footer.is_empty() {
            body.push(line);
        } else {
            footer.push(line);
        }
    }

    if !body.is_empty() {
        message.body = Some(body.join("\n"));
    }
    if !footer.is_empty() {
        let footer = footer.join("\n");
        message.breaking |= footer.contains("BREAKING CHANGE");
        message.footer = Some(footer);
    }

    debug!(
        commit_type = %message.commit_type,
        scope = ?message.scope,
        breaking = message.breaking,
        "Parsed commit message"
    );
    Ok(message)
}

fn is_footer_line(line: &str) -> bool {
    line.contains(':') && FOOTER_KEYWORDS.iter().any(|k| line.starts_with(k))
}

/// Parse `type(scope)!: description`, falling back to `chore` with the whole
/// subject when there is no colon.
fn parse_subject(subject: &str) -> CommitMessage {
    let Some((head, description)) = subject.split_once(':') else {
        return CommitMessage::new(CommitType::Chore, subject);
    };

    let mut head = head.trim();
    let breaking = match head.strip_suffix('!') {
        Some(rest) => {
            head = rest;
            true
        }
        None => false,
    };

    let (type_name, scope) = match head.split_once('(') {
        Some((name, rest)) => {
            let scope = rest.trim_end_matches(')').trim();
            (name.trim(), (!scope.is_empty()).then(|| scope.to_string()))
        }
        None => (head, None),
    };

    let commit_type = type_name.parse().unwrap_or_else(|_| {
        debug!(type_name, "Unknown commit type in model answer; using chore");
        CommitType::Chore
    });

    CommitMessage {
        commit_type,
        scope,
        description: strip_type_prefix(description.trim()).to_string(),
        body: None,
        footer: None,
        breaking,
    }
}

/// Drop a second type prefix the model sometimes repeats, as in
/// `feat: feat: add login`.
fn strip_type_prefix(description: &str) -> &str {
    for commit_type in CommitType::ALL {
        let prefix = commit_type.as_str();
        let Some(head) = description.get(..prefix.len() + 1) else {
            continue;
        };
        if head.eq_ignore_ascii_case(&format!("{prefix}:")) {
            return description[prefix.len() + 1..].trim_start();
        }
    }
    description
}
