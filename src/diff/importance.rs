//! File importance scoring from path patterns.

use serde::Serialize;

/// Category a path falls into, with its importance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    DependencyManifest,
    Configuration,
    Documentation,
    Source,
    Test,
    WebAsset,
    Other,
}

impl FileCategory {
    pub fn score(&self) -> u8 {
        match self {
            FileCategory::DependencyManifest => 9,
            FileCategory::Configuration => 8,
            FileCategory::Documentation => 7,
            FileCategory::Source => 6,
            FileCategory::Test => 5,
            FileCategory::WebAsset => 4,
            FileCategory::Other => 3,
        }
    }
}

/// A single lowercase path test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatcher {
    Contains(&'static str),
    Suffix(&'static str),
}

impl PathMatcher {
    fn matches(&self, lowered: &str) -> bool {
        match self {
            PathMatcher::Contains(needle) => lowered.contains(needle),
            PathMatcher::Suffix(suffix) => lowered.ends_with(suffix),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportanceRule {
    pub category: FileCategory,
    pub matchers: Vec<PathMatcher>,
}

/// Ordered importance rules. The first rule with a matching path wins, so test
/// patterns sit ahead of generic source extensions.
#[derive(Debug, Clone)]
pub struct ImportanceRules {
    rules: Vec<ImportanceRule>,
}

impl Default for ImportanceRules {
    fn default() -> Self {
        use PathMatcher::{Contains, Suffix};

        let rule = |category, matchers: &[PathMatcher]| ImportanceRule {
            category,
            matchers: matchers.to_vec(),
        };

        Self {
            rules: vec![
                rule(
                    FileCategory::DependencyManifest,
                    &[
                        Contains("package.json"),
                        Contains("go.mod"),
                        Contains("requirements.txt"),
                        Contains("cargo.toml"),
                        Contains("pom.xml"),
                        Contains("build.gradle"),
                    ],
                ),
                rule(
                    FileCategory::Configuration,
                    &[
                        Contains("config"),
                        Contains(".env"),
                        Suffix(".json"),
                        Suffix(".yaml"),
                        Suffix(".yml"),
                        Suffix(".toml"),
                    ],
                ),
                rule(
                    FileCategory::Documentation,
                    &[Suffix(".md"), Suffix(".rst"), Contains("readme"), Contains("doc")],
                ),
                rule(
                    FileCategory::Test,
                    &[Contains("test"), Contains("spec"), Suffix("_test.go"), Suffix(".test.js")],
                ),
                rule(
                    FileCategory::Source,
                    &[
                        Suffix(".go"),
                        Suffix(".js"),
                        Suffix(".ts"),
                        Suffix(".py"),
                        Suffix(".java"),
                        Suffix(".cpp"),
                        Suffix(".c"),
                        Suffix(".rs"),
                    ],
                ),
                rule(
                    FileCategory::WebAsset,
                    &[
                        Suffix(".css"),
                        Suffix(".scss"),
                        Suffix(".html"),
                        Suffix(".vue"),
                        Suffix(".jsx"),
                        Suffix(".tsx"),
                    ],
                ),
            ],
        }
    }
}

impl ImportanceRules {
    pub fn new(rules: Vec<ImportanceRule>) -> Self {
        Self { rules }
    }

    pub fn categorize(&self, path: &str) -> FileCategory {
        let lowered = path.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matchers.iter().any(|m| m.matches(&lowered)))
            .map(|rule| rule.category)
            .unwrap_or(FileCategory::Other)
    }

    pub fn score(&self, path: &str) -> u8 {
        self.categorize(path).score()
    }
}
