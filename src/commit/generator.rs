//! The commit message pipeline: diff in, formatted and validated message out.

use serde::Serialize;
use tracing::{debug, info};

use super::formatter::MessageFormatter;
use super::message::{CommitMessage, MessageStyle, parse_model_response};
use super::prompt::build_commit_prompt;
use super::validator::{ValidationResult, Validator};
use crate::context::ContextAnalyzer;
use crate::diff::{DiffParser, DiffProcessor, ProcessedDiff};
use crate::error::CommitError;
use crate::git::HistorySource;
use crate::llm::ModelExecutor;
use crate::scope::ScopeDetector;

/// A diff after every local analysis step, before the model is asked.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedChanges {
    pub processed: ProcessedDiff,
    /// Scope from the changed paths.
    pub scope: Option<String>,
    /// Scope suggested by keywords in the diff content.
    pub content_scope: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCommit {
    pub message: CommitMessage,
    pub formatted: String,
    pub validation: ValidationResult,
    pub format_issues: Vec<String>,
    pub prepared: PreparedChanges,
}

pub struct CommitGenerator<H, M> {
    parser: DiffParser,
    processor: DiffProcessor,
    analyzer: ContextAnalyzer<H>,
    scopes: ScopeDetector,
    formatter: MessageFormatter,
    validator: Validator,
    style: MessageStyle,
    model: M,
}

impl<H, M> CommitGenerator<H, M>
where
    H: HistorySource,
    M: ModelExecutor,
{
    pub fn new(history: H, model: M) -> Self {
        Self {
            parser: DiffParser::default(),
            processor: DiffProcessor::default(),
            analyzer: ContextAnalyzer::new(history),
            scopes: ScopeDetector::default(),
            formatter: MessageFormatter::default(),
            validator: Validator::default(),
            style: MessageStyle::default(),
            model,
        }
    }

    pub fn with_parser(mut self, parser: DiffParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_processor(mut self, processor: DiffProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_analyzer(mut self, analyzer: ContextAnalyzer<H>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_scope_detector(mut self, scopes: ScopeDetector) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_formatter(mut self, formatter: MessageFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_style(mut self, style: MessageStyle) -> Self {
        self.style = style;
        self
    }

    /// Parse, analyze and budget a raw diff without calling the model.
    pub fn prepare(&self, diff_text: &str) -> Result<PreparedChanges, CommitError> {
        let summary = self.parser.parse(diff_text);
        if summary.is_empty() {
            return Err(CommitError::NoChanges);
        }

        let context = self.analyzer.analyze(&summary);
        let scope = self.scopes.detect_scope(&summary);
        let content_scope = self.scopes.suggest_scope_from_content(&summary);
        let processed = self.processor.process(summary).with_change_context(context);

        debug!(
            files = processed.total_files,
            chunks = processed.chunks.len(),
            scope = ?scope,
            "Prepared changes"
        );
        Ok(PreparedChanges {
            processed,
            scope,
            content_scope,
        })
    }

    pub async fn generate(&self, diff_text: &str) -> Result<GeneratedCommit, CommitError> {
        let prepared = self.prepare(diff_text)?;

        let prompt = build_commit_prompt(&prepared.processed, prepared.scope.as_deref(), self.style);
        let response = self.model.complete(&prompt).await?;
        let mut message = parse_model_response(&response, self.style)?;

        if self.style == MessageStyle::Conventional && message.scope.is_none() {
            message.scope = prepared.scope.clone();
        }

        let formatted = self.formatter.format(&message);
        let validation = self.validator.validate_text(&formatted);
        let format_issues = self.formatter.validate_format(&message);
        info!(
            valid = validation.is_valid,
            warnings = validation.warnings.len(),
            "Generated commit message"
        );

        Ok(GeneratedCommit {
            message,
            formatted,
            validation,
            format_issues,
            prepared,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::message::CommitType;
    use crate::error::ModelError;
    use crate::git::MockHistorySource;
    use crate::llm::MockModelExecutor;

    const DIFF: &str = "diff --git a/internal/ai/client.go b/internal/ai/client.go\n\
                        --- a/internal/ai/client.go\n\
                        +++ b/internal/ai/client.go\n\
                        @@ -1,3 +1,3 @@\n\
                        -func Call() error {\n\
                        +func Call(ctx context.Context) error {\n";

    fn quiet_history() -> MockHistorySource {
        let mut history = MockHistorySource::new();
        history.expect_recent_commits().returning(|_| Ok(Vec::new()));
        history.expect_file_history().returning(|_, _| Ok(Vec::new()));
        history
    }

    #[test]
    fn test_prepare_rejects_empty_diff() {
        let generator = CommitGenerator::new(MockHistorySource::new(), MockModelExecutor::new());
        assert!(matches!(generator.prepare("  \n"), Err(CommitError::NoChanges)));
    }

    #[test]
    fn test_prepare_attaches_context_and_scope() {
        let generator = CommitGenerator::new(quiet_history(), MockModelExecutor::new());
        let prepared = generator.prepare(DIFF).unwrap();

        assert_eq!(prepared.scope.as_deref(), Some("ai"));
        let context = prepared.processed.change_context.as_ref().unwrap();
        assert_eq!(context.function_changes.len(), 1);
        assert_eq!(context.function_changes[0].function_name, "Call");
    }

    #[tokio::test]
    async fn test_generate_applies_detected_scope() {
        let mut model = MockModelExecutor::new();
        model
            .expect_complete()
            .withf(|prompt| prompt.contains("Use the scope `ai`."))
            .returning(|_| Ok("refactor: pass context to model calls\n\nCalls can now be cancelled.".to_string()));

        let generator = CommitGenerator::new(quiet_history(), model);
        let commit = generator.generate(DIFF).await.unwrap();

        assert_eq!(commit.message.commit_type, CommitType::Refactor);
        assert_eq!(commit.message.scope.as_deref(), Some("ai"));
        assert_eq!(
            commit.formatted,
            "refactor(ai): Pass context to model calls\n\n- Calls can now be cancelled."
        );
        assert!(commit.validation.is_valid);
        assert!(commit.format_issues.is_empty());
    }

    #[tokio::test]
    async fn test_generate_keeps_model_scope() {
        let mut model = MockModelExecutor::new();
        model
            .expect_complete()
            .returning(|_| Ok("fix(client): handle nil context".to_string()));

        let generator = CommitGenerator::new(quiet_history(), model);
        let commit = generator.generate(DIFF).await.unwrap();
        assert_eq!(commit.formatted, "fix(client): Handle nil context");
    }

    #[tokio::test]
    async fn test_generate_propagates_model_failure() {
        let mut model = MockModelExecutor::new();
        model.expect_complete().returning(|_| Err(ModelError::Timeout(300)));

        let generator = CommitGenerator::new(quiet_history(), model);
        let err = generator.generate(DIFF).await.unwrap_err();
        assert!(matches!(err, CommitError::Model(ModelError::Timeout(300))));
    }
}
