//! Builds a [`ChangeContext`] from a diff and the repository history.

use tracing::{debug, warn};

use super::config_changes::ConfigChangeDetector;
use super::functions::FunctionChangeDetector;
use super::patterns::classify_changes;
use super::performance::PerformanceDetector;
use super::types::ChangeContext;
use crate::diff::DiffSummary;
use crate::git::HistorySource;

pub const DEFAULT_RECENT_COMMITS: usize = 10;
pub const DEFAULT_RELATED_COMMITS: usize = 5;

pub struct ContextAnalyzer<H> {
    history: H,
    config_changes: ConfigChangeDetector,
    function_changes: FunctionChangeDetector,
    performance: PerformanceDetector,
    recent_limit: usize,
    related_limit: usize,
}

impl<H: HistorySource> ContextAnalyzer<H> {
    pub fn new(history: H) -> Self {
        Self {
            history,
            config_changes: ConfigChangeDetector::default(),
            function_changes: FunctionChangeDetector::default(),
            performance: PerformanceDetector::default(),
            recent_limit: DEFAULT_RECENT_COMMITS,
            related_limit: DEFAULT_RELATED_COMMITS,
        }
    }

    pub fn with_config_detector(mut self, detector: ConfigChangeDetector) -> Self {
        self.config_changes = detector;
        self
    }

    pub fn with_function_detector(mut self, detector: FunctionChangeDetector) -> Self {
        self.function_changes = detector;
        self
    }

    pub fn with_performance_detector(mut self, detector: PerformanceDetector) -> Self {
        self.performance = detector;
        self
    }

    pub fn with_history_limits(mut self, recent: usize, related: usize) -> Self {
        self.recent_limit = recent;
        self.related_limit = related;
        self
    }

    /// Run every detector over `summary`. History lookups that fail leave the
    /// commit lists empty.
    pub fn analyze(&self, summary: &DiffSummary) -> ChangeContext {
        let recent_commits = self
            .history
            .recent_commits(self.recent_limit)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read recent commits");
                Vec::new()
            });

        let related_commits = self
            .history
            .file_history(&summary.paths(), self.related_limit)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read history for changed files");
                Vec::new()
            });

        let context = ChangeContext {
            recent_commits,
            related_commits,
            config_changes: self.config_changes.detect(&summary.files),
            function_changes: self.function_changes.detect(&summary.files),
            performance_hints: self.performance.detect(&summary.files),
            change_patterns: classify_changes(&summary.files),
        };

        debug!(
            config_changes = context.config_changes.len(),
            function_changes = context.function_changes.len(),
            performance_hints = context.performance_hints.len(),
            "Analyzed change context"
        );
        context
    }
}
