//! Scope detection over a set of changed paths.

use std::collections::BTreeMap;

use regex_lite::Regex;
use tracing::{debug, warn};

use super::content::ContentKeywords;
use super::rules::{HIGH_PRIORITY_SCOPES, ScopeDetectionRule, default_rules};
use crate::diff::DiffSummary;

/// Share of files a scope must cover to be chosen outright.
const MAJORITY_SHARE: f64 = 0.5;
/// Files needed for an allow-listed scope to win without a majority.
const HIGH_PRIORITY_MIN_FILES: usize = 2;

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ScopeDetectionRule,
    regex: Regex,
}

impl CompiledRule {
    fn compile(rule: ScopeDetectionRule) -> Option<Self> {
        match Regex::new(&rule.pattern) {
            Ok(regex) => Some(Self { rule, regex }),
            Err(e) => {
                warn!(pattern = %rule.pattern, error = %e, "Skipping invalid scope rule");
                None
            }
        }
    }

    fn scope_for(&self, path: &str) -> Option<String> {
        let caps = self.regex.captures(path)?;
        let mut scope = String::new();
        caps.expand(&self.rule.scope, &mut scope);
        (!scope.is_empty()).then_some(scope)
    }
}

#[derive(Debug, Default)]
struct ScopeTally {
    files: usize,
    best_priority: i32,
}

/// Infers a conventional-commit scope from changed paths.
///
/// Rules are evaluated highest priority first; within one priority the
/// original order is kept.
#[derive(Debug, Clone)]
pub struct ScopeDetector {
    rules: Vec<CompiledRule>,
    content_keywords: ContentKeywords,
}

impl Default for ScopeDetector {
    fn default() -> Self {
        Self::with_rules(default_rules())
    }
}

impl ScopeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<ScopeDetectionRule>) -> Self {
        let mut detector = Self {
            rules: rules.into_iter().filter_map(CompiledRule::compile).collect(),
            content_keywords: ContentKeywords::default(),
        };
        detector.sort_rules();
        detector
    }

    pub fn with_content_keywords(mut self, keywords: ContentKeywords) -> Self {
        self.content_keywords = keywords;
        self
    }

    pub fn add_custom_rule(&mut self, rule: ScopeDetectionRule) {
        if let Some(compiled) = CompiledRule::compile(rule) {
            self.rules.push(compiled);
            self.sort_rules();
        }
    }

    fn sort_rules(&mut self) {
        self.rules.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));
    }

    pub fn rules(&self) -> impl Iterator<Item = &ScopeDetectionRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Scope of the first matching rule, with that rule's priority.
    fn detect_for_path(&self, path: &str) -> Option<(String, i32)> {
        self.rules
            .iter()
            .find_map(|c| c.scope_for(path).map(|scope| (scope, c.rule.priority)))
    }

    pub fn detect_scope_for_path(&self, path: &str) -> Option<String> {
        self.detect_for_path(path).map(|(scope, _)| scope)
    }

    /// Pick a single scope for the whole change set, or `None` when the paths
    /// disagree too much.
    pub fn detect_scope(&self, summary: &DiffSummary) -> Option<String> {
        let total = summary.files.len();
        if total == 0 {
            return None;
        }
        if let [only] = summary.files.as_slice() {
            return self.detect_scope_for_path(&only.path);
        }

        let tallies = self.tally(summary);
        let (scope, tally) = tallies.into_iter().max_by(|(sa, a), (sb, b)| {
            a.files
                .cmp(&b.files)
                .then(a.best_priority.cmp(&b.best_priority))
                .then(sb.cmp(sa))
        })?;

        let share = tally.files as f64 / total as f64;
        if share >= MAJORITY_SHARE {
            debug!(scope = %scope, share, "Scope covers majority of files");
            return Some(scope);
        }
        if tally.files >= HIGH_PRIORITY_MIN_FILES && HIGH_PRIORITY_SCOPES.contains(&scope.as_str()) {
            debug!(scope = %scope, files = tally.files, "Using high-priority scope without majority");
            return Some(scope);
        }

        debug!(scope = %scope, share, "No scope covers enough files");
        None
    }

    fn tally(&self, summary: &DiffSummary) -> BTreeMap<String, ScopeTally> {
        let mut tallies: BTreeMap<String, ScopeTally> = BTreeMap::new();
        for file in &summary.files {
            if let Some((scope, priority)) = self.detect_for_path(&file.path) {
                let entry = tallies.entry(scope).or_insert(ScopeTally {
                    files: 0,
                    best_priority: priority,
                });
                entry.files += 1;
                entry.best_priority = entry.best_priority.max(priority);
            }
        }
        tallies
    }

    /// Share of files matched per scope.
    pub fn detect_multiple_scopes(&self, summary: &DiffSummary) -> BTreeMap<String, f64> {
        let total = summary.files.len();
        if total == 0 {
            return BTreeMap::new();
        }
        self.tally(summary)
            .into_iter()
            .map(|(scope, tally)| (scope, tally.files as f64 / total as f64))
            .collect()
    }

    /// Every rule matching `path`, in evaluation order.
    pub fn matching_rules(&self, path: &str) -> Vec<&ScopeDetectionRule> {
        self.rules
            .iter()
            .filter(|c| c.regex.is_match(path))
            .map(|c| &c.rule)
            .collect()
    }

    /// Content keyword heuristic. Independent of [`Self::detect_scope`].
    pub fn suggest_scope_from_content(&self, summary: &DiffSummary) -> Option<String> {
        self.content_keywords.suggest(summary)
    }
}
