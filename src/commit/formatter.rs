//! Rendering of [`CommitMessage`] into commit text.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Deserialize;

use super::message::CommitMessage;

static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+").expect("Invalid regex"));

const BULLET: &str = "- ";
const CONTINUATION: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub max_subject_length: usize,
    pub max_body_line_length: usize,
    pub auto_wrap_body: bool,
    /// Render each body sentence as its own bullet.
    pub break_on_sentence: bool,
    pub enforce_blank_line: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            max_subject_length: 50,
            max_body_line_length: 72,
            auto_wrap_body: true,
            break_on_sentence: true,
            enforce_blank_line: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageFormatter {
    config: FormatterConfig,
}

impl MessageFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    pub fn format(&self, message: &CommitMessage) -> String {
        let mut text = self.format_subject(message);

        if let Some(body) = message.body.as_deref().filter(|b| !b.trim().is_empty()) {
            text.push_str(if self.config.enforce_blank_line { "\n\n" } else { "\n" });
            text.push_str(&self.format_body(body));
        }

        if let Some(footer) = message.footer.as_deref().filter(|f| !f.trim().is_empty()) {
            text.push_str("\n\n");
            text.push_str(footer);
        }

        text
    }

    /// Subject line with the description capitalized, its trailing period
    /// removed and cut at a word boundary to fit the length limit.
    pub fn format_subject(&self, message: &CommitMessage) -> String {
        let prefix = message.header_prefix();
        let description = capitalize_first(&message.description);
        let mut description = description.strip_suffix('.').unwrap_or(&description).to_string();

        let prefix_len = prefix.chars().count();
        if prefix_len + description.chars().count() > self.config.max_subject_length {
            let room = self.config.max_subject_length.saturating_sub(prefix_len);
            if room > 0 {
                description = truncate_at_word(&description, room);
            }
        }

        prefix + &description
    }

    pub fn format_body(&self, body: &str) -> String {
        if !self.config.auto_wrap_body {
            return body.to_string();
        }

        body.split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .map(|p| self.format_paragraph(p))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn format_paragraph(&self, paragraph: &str) -> String {
        let width = self.config.max_body_line_length;
        if !self.config.break_on_sentence {
            return wrap_text(&collapse_whitespace(paragraph), width);
        }

        let item_width = width.saturating_sub(BULLET.len()).max(1);
        let mut lines = Vec::new();
        for sentence in paragraph_sentences(paragraph) {
            let wrapped = wrap_text(&sentence, item_width);
            for (i, line) in wrapped.lines().enumerate() {
                let marker = if i == 0 { BULLET } else { CONTINUATION };
                lines.push(format!("{marker}{line}"));
            }
        }
        lines.join("\n")
    }

    /// Quick checks on the rendered message.
    pub fn validate_format(&self, message: &CommitMessage) -> Vec<String> {
        let mut issues = Vec::new();
        let subject = self.format_subject(message);

        if subject.chars().count() > self.config.max_subject_length {
            issues.push(format!(
                "Subject line is too long (>{} characters)",
                self.config.max_subject_length
            ));
        }
        if subject.ends_with('.') {
            issues.push("Subject line should not end with a period".to_string());
        }

        if let Some(body) = message.body.as_deref() {
            for (i, line) in body.lines().enumerate() {
                if line.chars().count() > self.config.max_body_line_length {
                    issues.push(format!(
                        "Body line {} is too long (>{} characters)",
                        i + 1,
                        self.config.max_body_line_length
                    ));
                }
            }
        }

        issues
    }
}

/// Sentences of a paragraph. A paragraph made only of bullet lines yields its
/// items' sentences instead of one run-on sentence.
fn paragraph_sentences(paragraph: &str) -> Vec<String> {
    let lines: Vec<&str> = paragraph.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let bulleted = lines.iter().all(|l| l.starts_with("- ") || l.starts_with("* "));

    if bulleted {
        lines
            .iter()
            .flat_map(|l| split_sentences(&collapse_whitespace(&l[2..])))
            .collect()
    } else {
        split_sentences(&collapse_whitespace(paragraph))
    }
}

/// Split after runs of `.`, `!` or `?` followed by whitespace, keeping the
/// first punctuation mark on each sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for ender in SENTENCE_END_RE.find_iter(text) {
        let part = text[start..ender.start()].trim();
        if !part.is_empty() {
            let mark = &ender.as_str()[..1];
            sentences.push(format!("{part}{mark}"));
        }
        start = ender.end();
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Greedy word wrap. A word longer than `width` gets a line of its own.
pub fn wrap_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed <= width || current.is_empty() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Cut `text` to at most `max` characters at the last space, or hard-cut with
/// `...` when there is no space to cut at.
pub fn truncate_at_word(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let head: String = text.chars().take(max).collect();
    match head.rfind(' ') {
        Some(idx) if idx > 0 => head[..idx].to_string(),
        _ => {
            let kept: String = text.chars().take(max.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::message::CommitType;

    #[test]
    fn test_subject_capitalized_and_period_stripped() {
        let message = CommitMessage::new(CommitType::Fix, "handle empty input.").with_scope("parser");
        assert_eq!(
            MessageFormatter::default().format_subject(&message),
            "fix(parser): Handle empty input"
        );
    }

    #[test]
    fn test_subject_truncated_at_word_boundary() {
        let message = CommitMessage::new(
            CommitType::Feat,
            "add two-factor authentication support for all users",
        )
        .with_scope("auth");
        let subject = MessageFormatter::default().format_subject(&message);

        assert_eq!(subject, "feat(auth): Add two-factor authentication support");
        assert!(subject.chars().count() <= 50);
    }

    #[test]
    fn test_truncate_without_spaces() {
        assert_eq!(truncate_at_word("abcdefghij", 6), "abc...");
        assert_eq!(truncate_at_word("short", 10), "short");
    }

    #[test]
    fn test_body_bulleted_by_sentence() {
        let message = CommitMessage::new(CommitType::Feat, "add cache")
            .with_body("Lookups were slow. The cache keeps hot keys in memory!");
        assert_eq!(
            MessageFormatter::default().format(&message),
            "feat: Add cache\n\n- Lookups were slow.\n- The cache keeps hot keys in memory!"
        );
    }

    #[test]
    fn test_long_sentence_wraps_with_continuation_indent() {
        let formatter = MessageFormatter::new(FormatterConfig {
            max_body_line_length: 20,
            ..FormatterConfig::default()
        });
        let body = formatter.format_body("one two three four five six seven");
        assert_eq!(body, "- one two three four\n  five six seven");
        assert!(body.lines().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn test_existing_bullets_are_not_doubled() {
        let body = MessageFormatter::default().format_body("- Add parser\n- Wire it into the CLI");
        assert_eq!(body, "- Add parser\n- Wire it into the CLI");
    }

    #[test]
    fn test_plain_wrap_without_sentence_breaks() {
        let formatter = MessageFormatter::new(FormatterConfig {
            max_body_line_length: 10,
            break_on_sentence: false,
            ..FormatterConfig::default()
        });
        assert_eq!(formatter.format_body("aaa bbb ccc. ddd"), "aaa bbb\nccc. ddd");
    }

    #[test]
    fn test_paragraphs_and_footer() {
        let mut message = CommitMessage::new(CommitType::Fix, "stop leak").with_body("First.\n\nSecond.");
        message.footer = Some("Closes #3".to_string());
        assert_eq!(
            MessageFormatter::default().format(&message),
            "fix: Stop leak\n\n- First.\n\n- Second.\n\nCloses #3"
        );
    }

    #[test]
    fn test_validate_format() {
        let formatter = MessageFormatter::new(FormatterConfig {
            max_body_line_length: 10,
            ..FormatterConfig::default()
        });
        let message = CommitMessage::new(CommitType::Docs, "explain").with_body("short\nthis line is long");
        assert_eq!(
            formatter.validate_format(&message),
            vec!["Body line 2 is too long (>10 characters)".to_string()]
        );
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Fix it... Then ship? Yes"),
            vec!["Fix it.", "Then ship?", "Yes"]
        );
    }
}
