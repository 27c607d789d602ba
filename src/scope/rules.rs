//! Path-based scope rules.

use serde::{Deserialize, Serialize};

/// Scopes returned even without majority coverage when at least two files
/// agree on them.
pub const HIGH_PRIORITY_SCOPES: &[&str] = &[
    "auth", "api", "db", "security", "core", "config", "ci", "ui", "deps", "payment", "user",
];

/// Maps a path regex to a conventional-commit scope.
///
/// `scope` may reference the regex's capture groups (`$1`), so
/// `^internal/([^/]+)/` with scope `$1` turns `internal/ai/client.go` into `ai`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDetectionRule {
    pub pattern: String,
    pub scope: String,
    pub priority: i32,
    #[serde(default)]
    pub description: String,
}

impl ScopeDetectionRule {
    pub fn new(pattern: &str, scope: &str, priority: i32, description: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            scope: scope.to_string(),
            priority,
            description: description.to_string(),
        }
    }
}

/// The built-in rule table.
pub fn default_rules() -> Vec<ScopeDetectionRule> {
    let r = ScopeDetectionRule::new;
    vec![
        r(r"^internal/([^/]+)/", "$1", 100, "Internal package directory"),
        // UI
        r(r"\.(js|jsx|ts|tsx|vue|svelte|html|css|scss|sass|less)$", "ui", 80, "Frontend files"),
        r(r"^(src/|app/)?components?/", "ui", 85, "UI components"),
        r(r"^(src/|app/)?pages?/", "ui", 85, "Page components"),
        // API
        r(r"^(src/|app/)?(api|routes?|controllers?|handlers?)/", "api", 90, "API endpoints"),
        r(r"^(src/|app/)?middleware/", "api", 85, "API middleware"),
        // Database
        r(r"^(src/|app/)?(models?|entities?|schemas?)/", "db", 90, "Data models"),
        r(r"^(src/|app/)?(migrations?|seeds?)/", "db", 95, "Database migrations"),
        r(r"\.(sql|migration)$", "db", 90, "SQL files"),
        // Auth
        r(r"^(src/|app/)?(auth|security)/", "auth", 90, "Authentication and security"),
        // Configuration
        r(r"^(config|configs?)/", "config", 95, "Configuration directory"),
        r(r"\.(env|config|conf|ini|yaml|yml|toml|json)$", "config", 85, "Configuration files"),
        r(r"^\.env", "config", 90, "Environment files"),
        // Tests
        r(r"^(test|tests?|spec|specs?)/", "test", 95, "Test directory"),
        r(r"\.(test|spec)\.(js|jsx|ts|tsx|go|py|rb|java|php)$", "test", 90, "Test files"),
        r(r"_test\.(go|rs)$", "test", 90, "Go and Rust test files"),
        // Documentation
        r(r"^(docs?|documentation)/", "docs", 95, "Documentation directory"),
        r(r"\.(md|rst|txt|adoc)$", "docs", 80, "Documentation files"),
        r(r"^README", "docs", 85, "README files"),
        // CI/CD
        r(r"^\.github/workflows/", "ci", 95, "GitHub Actions"),
        r(r"^\.gitlab-ci\.yml$", "ci", 95, "GitLab CI"),
        r(r"^(Dockerfile|docker-compose\.yml|\.dockerignore)$", "ci", 90, "Docker files"),
        r(r"^(Makefile|Jenkinsfile)$", "ci", 90, "Build files"),
        // Dependencies
        r(
            r"^(package\.json|yarn\.lock|package-lock\.json|go\.mod|go\.sum|Cargo\.toml|Cargo\.lock|requirements\.txt|Pipfile|composer\.json)$",
            "deps",
            85,
            "Dependency manifests",
        ),
        // Shared code
        r(r"^(src/|app/)?(utils?|helpers?|lib|libs?)/", "utils", 80, "Utilities"),
        r(r"^(src/|app/)?services?/", "service", 85, "Service layer"),
        r(r"^(src/|app/)?(core|internal)/", "core", 85, "Core modules"),
    ]
}
