//! Prompt construction for commit message generation.

use super::message::{CommitType, MessageStyle};
use crate::context::ChangeContext;
use crate::diff::ProcessedDiff;

/// Chunks described individually before the rest are summarized.
const MAX_PROMPT_CHUNKS: usize = 3;
/// Recent commits listed for context.
const MAX_PROMPT_COMMITS: usize = 5;

/// Build the prompt asking for a commit message in `style`.
///
/// `scope` is the scope detected from the changed paths; the model is told to
/// use it for conventional messages.
pub fn build_commit_prompt(processed: &ProcessedDiff, scope: Option<&str>, style: MessageStyle) -> String {
    let mut prompt = String::from(
        "You are writing a Git commit message. Explain what changed and, more importantly, why.\n\n",
    );

    push_style_instructions(&mut prompt, scope, style);

    prompt.push_str(&format!("## Change Summary\n{}\n\n", processed.summary));

    if !processed.languages.is_empty() {
        prompt.push_str("## Languages\n");
        for (language, count) in &processed.languages {
            prompt.push_str(&format!("- {language} ({count} files)\n"));
        }
        prompt.push('\n');
    }

    if let Some(context) = &processed.change_context {
        push_context(&mut prompt, context);
    }

    if !processed.chunks.is_empty() {
        prompt.push_str("## File Changes\n");
        for (i, chunk) in processed.chunks.iter().enumerate() {
            if i == MAX_PROMPT_CHUNKS {
                prompt.push_str(&format!("... and {} more chunks\n", processed.chunks.len() - i));
                break;
            }
            prompt.push_str(&format!("Chunk {}: {}\n", i + 1, chunk.description));
            for file in &chunk.files {
                if !file.content.is_empty() {
                    prompt.push_str(&format!("```diff\n{}\n```\n", file.content.trim_end()));
                }
            }
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "## Rules\n\
         - Keep the subject line under 50 characters\n\
         - Use imperative mood (\"Add feature\", not \"Added feature\")\n\
         - Leave a blank line between subject and body\n\
         - In the body, explain the reason for configuration, function and performance changes\n\
         - Put `BREAKING CHANGE: ...`, `Closes #N` or `Fixes #N` lines last, as footers\n\n\
         Reply with the commit message only, without commentary or code fences.",
    );
    prompt
}

fn push_style_instructions(prompt: &mut String, scope: Option<&str>, style: MessageStyle) {
    match style {
        MessageStyle::Conventional => {
            let types: Vec<&str> = CommitType::ALL.iter().map(|t| t.as_str()).collect();
            prompt.push_str("Follow the Conventional Commits format:\n<type>(<scope>): <description>\n\n<body>\n\n<footer>\n\n");
            prompt.push_str(&format!("Choose exactly one type: {}\n", types.join(", ")));
            match scope {
                Some(scope) => {
                    prompt.push_str(&format!("Use the scope `{scope}`.\n"));
                }
                None => prompt.push_str("Omit the scope unless one module clearly dominates.\n"),
            }
        }
        MessageStyle::Simple => {
            prompt.push_str("Write a short, plain subject line and a brief reason for the change.\n");
        }
        MessageStyle::Detailed => {
            prompt.push_str("Write a subject line and a body covering both what changed and why.\n");
        }
    }
    prompt.push('\n');
}

fn push_context(prompt: &mut String, context: &ChangeContext) {
    if !context.recent_commits.is_empty() {
        prompt.push_str("## Recent Commits\n");
        for commit in context.recent_commits.iter().take(MAX_PROMPT_COMMITS) {
            prompt.push_str(&format!("- {}: {}\n", commit.short_hash(), commit.subject));
        }
        prompt.push('\n');
    }

    if !context.config_changes.is_empty() {
        prompt.push_str("## Configuration Changes\n");
        for change in &context.config_changes {
            let detail = match (&change.old_value, &change.new_value) {
                (Some(old), Some(new)) => format!(": {old} -> {new}"),
                (None, Some(new)) => format!(": set to {new}"),
                (Some(old), None) => format!(": removed (was {old})"),
                (None, None) => String::new(),
            };
            prompt.push_str(&format!("- {} in {}{detail}\n", change.parameter, change.file));
            if !change.context.is_empty() {
                prompt.push_str(&format!("  Context: {}\n", change.context));
            }
        }
        prompt.push('\n');
    }

    if !context.function_changes.is_empty() {
        prompt.push_str("## Function Changes\n");
        for change in &context.function_changes {
            prompt.push_str(&format!(
                "- {} in {}: {}\n",
                change.function_name, change.file, change.change_type
            ));
            prompt.push_str(&format!("  Impact: {}\n", change.impact));
        }
        prompt.push('\n');
    }

    if !context.performance_hints.is_empty() {
        prompt.push_str("## Performance-Related Changes\n");
        for hint in &context.performance_hints {
            prompt.push_str(&format!("- {hint}\n"));
        }
        prompt.push('\n');
    }

    let patterns: Vec<&str> = [
        ("likely_refactoring", "This looks like a refactoring"),
        ("likely_new_feature", "This looks like a new feature"),
        ("documentation_update", "Documentation was updated"),
    ]
    .into_iter()
    .filter(|(name, _)| context.flag(name))
    .map(|(_, text)| text)
    .collect();

    if !patterns.is_empty() {
        prompt.push_str("## Change Patterns\n");
        for pattern in patterns {
            prompt.push_str(&format!("- {pattern}\n"));
        }
        prompt.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::classify_changes;
    use crate::diff::{DiffProcessor, parse_diff};

    const DIFF: &str = "diff --git a/docs/guide.md b/docs/guide.md\n\
                        new file mode 100644\n\
                        --- /dev/null\n\
                        +++ b/docs/guide.md\n\
                        @@ -0,0 +1 @@\n\
                        +# Guide\n";

    #[test]
    fn test_conventional_prompt_mentions_scope_and_summary() {
        let processed = DiffProcessor::default().process(parse_diff(DIFF));
        let prompt = build_commit_prompt(&processed, Some("docs"), MessageStyle::Conventional);

        assert!(prompt.contains("Use the scope `docs`."));
        assert!(prompt.contains(&processed.summary));
        assert!(prompt.contains("Chunk 1: added: docs/guide.md (1+, 0-)"));
        assert!(prompt.contains("+# Guide"));
        assert!(prompt.contains("feat, fix, docs"));
    }

    #[test]
    fn test_context_sections() {
        let summary = parse_diff(DIFF);
        let context = ChangeContext {
            change_patterns: classify_changes(&summary.files),
            performance_hints: vec!["Caching mechanism changes detected".to_string()],
            ..ChangeContext::default()
        };
        let processed = DiffProcessor::default().process(summary).with_change_context(context);
        let prompt = build_commit_prompt(&processed, None, MessageStyle::Detailed);

        assert!(prompt.contains("## Performance-Related Changes\n- Caching mechanism changes detected"));
        assert!(prompt.contains("- This looks like a new feature"));
        assert!(prompt.contains("- Documentation was updated"));
        assert!(!prompt.contains("Conventional Commits"));
    }

    #[test]
    fn test_config_change_lines() {
        use crate::context::{ConfigChange, ScalarValue};

        let change = |parameter: &str, old: Option<&str>, new: Option<&str>| ConfigChange {
            file: "config/app.yaml".to_string(),
            parameter: parameter.to_string(),
            old_value: old.map(ScalarValue::parse),
            new_value: new.map(ScalarValue::parse),
            context: String::new(),
        };
        let context = ChangeContext {
            config_changes: vec![
                change("timeout", Some("30"), Some("60")),
                change("retries", None, Some("3")),
                change("legacy", Some("true"), None),
            ],
            ..ChangeContext::default()
        };
        let processed = DiffProcessor::default()
            .process(parse_diff(DIFF))
            .with_change_context(context);
        let prompt = build_commit_prompt(&processed, None, MessageStyle::Conventional);

        assert!(prompt.contains(
            "## Configuration Changes\n\
             - timeout in config/app.yaml: 30 -> 60\n\
             - retries in config/app.yaml: set to 3\n\
             - legacy in config/app.yaml: removed (was true)\n"
        ));
    }
}
