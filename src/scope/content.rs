//! Keyword-based scope suggestion from diff content.

use crate::diff::DiffSummary;

const DEFAULT_CONTENT_KEYWORDS: &[(&str, &[&str])] = &[
    ("auth", &["login", "password", "token", "authentication", "authorization", "jwt", "oauth"]),
    ("api", &["endpoint", "route", "handler", "controller", "middleware"]),
    ("db", &["database", "query", "migration", "schema", "table", "model"]),
    ("ui", &["component", "template", "style", "css", "html", "jsx", "vue"]),
    ("test", &["test", "spec", "mock", "fixture", "assert", "expect"]),
    ("config", &["config", "setting", "environment", "env", "constant"]),
    ("security", &["security", "encrypt", "decrypt", "hash", "validate", "sanitize"]),
    ("perf", &["performance", "optimize", "cache", "memory", "speed", "benchmark"]),
    ("docs", &["documentation", "readme", "comment", "doc", "guide", "manual"]),
    ("ci", &["pipeline", "build", "deploy", "workflow", "action", "jenkins"]),
];

/// Scope categories with the keywords that vote for them.
#[derive(Debug, Clone)]
pub struct ContentKeywords {
    categories: Vec<(String, Vec<String>)>,
}

impl Default for ContentKeywords {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CONTENT_KEYWORDS
                .iter()
                .map(|(scope, words)| (scope.to_string(), words.iter().map(|w| w.to_string()).collect()))
                .collect(),
        }
    }
}

impl ContentKeywords {
    pub fn new(categories: Vec<(String, Vec<String>)>) -> Self {
        Self { categories }
    }

    /// Each keyword found in a file's lowercased content scores one point for
    /// its scope. Returns the top-scoring scope; ties go to the earlier category.
    pub fn suggest(&self, summary: &DiffSummary) -> Option<String> {
        let contents: Vec<String> = summary.files.iter().map(|f| f.content.to_lowercase()).collect();

        let mut best: Option<(&str, usize)> = None;
        for (scope, keywords) in &self.categories {
            let score: usize = contents
                .iter()
                .map(|content| keywords.iter().filter(|k| content.contains(k.as_str())).count())
                .sum();
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((scope, score));
            }
        }

        best.map(|(scope, _)| scope.to_string())
    }
}
