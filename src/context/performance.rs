//! Keyword scan for performance-relevant edits.

use crate::diff::FileChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceCategory {
    Caching,
    Database,
    Concurrency,
    Memory,
    Algorithm,
    Io,
    Network,
    Monitoring,
}

impl PerformanceCategory {
    fn hint(&self, path: &str, keyword: &str) -> String {
        match self {
            PerformanceCategory::Caching => format!(
                "Caching optimization in {path} ({keyword}) - likely improving response times and reducing computational overhead"
            ),
            PerformanceCategory::Database => format!(
                "Database optimization in {path} ({keyword}) - likely improving query performance and data access efficiency"
            ),
            PerformanceCategory::Concurrency => format!(
                "Concurrency optimization in {path} ({keyword}) - likely improving throughput and resource utilization"
            ),
            PerformanceCategory::Memory => format!(
                "Memory optimization in {path} ({keyword}) - likely reducing memory usage and preventing leaks"
            ),
            PerformanceCategory::Algorithm => format!(
                "Algorithm optimization in {path} ({keyword}) - likely improving computational efficiency and reducing complexity"
            ),
            PerformanceCategory::Io => format!(
                "I/O optimization in {path} ({keyword}) - likely improving data processing throughput and reducing latency"
            ),
            PerformanceCategory::Network => format!(
                "Network optimization in {path} ({keyword}) - likely improving connection reliability and reducing network overhead"
            ),
            PerformanceCategory::Monitoring => format!(
                "Performance monitoring enhancement in {path} ({keyword}) - likely improving observability and performance tracking"
            ),
        }
    }
}

/// Ordered category table; each file yields at most one hint per category.
#[derive(Debug, Clone)]
pub struct PerformanceDetector {
    categories: Vec<(PerformanceCategory, Vec<String>)>,
}

impl Default for PerformanceDetector {
    fn default() -> Self {
        use PerformanceCategory::*;

        let table: &[(PerformanceCategory, &[&str])] = &[
            (Caching, &["cache", "memoize", "redis", "memcached", "lru", "ttl"]),
            (Database, &["index", "query", "sql", "database", "db", "orm", "transaction"]),
            (
                Concurrency,
                &["goroutine", "thread", "async", "await", "concurrent", "parallel", "mutex", "lock", "channel"],
            ),
            (Memory, &["memory", "heap", "gc", "garbage", "leak", "allocation", "buffer", "pool"]),
            (Algorithm, &["algorithm", "complexity", "optimize", "efficient", "sort", "search", "hash"]),
            (Io, &["io", "read", "write", "stream", "batch", "bulk", "pipeline"]),
            (Network, &["timeout", "retry", "connection", "keepalive", "compression"]),
            (Monitoring, &["benchmark", "profile", "metric", "monitor", "trace", "performance"]),
        ];

        Self::new(
            table
                .iter()
                .map(|(cat, words)| (*cat, words.iter().map(|w| w.to_string()).collect()))
                .collect(),
        )
    }
}

impl PerformanceDetector {
    pub fn new(categories: Vec<(PerformanceCategory, Vec<String>)>) -> Self {
        Self { categories }
    }

    pub fn detect(&self, files: &[FileChange]) -> Vec<String> {
        files.iter().flat_map(|f| self.hints_for(f)).collect()
    }

    fn hints_for(&self, file: &FileChange) -> Vec<String> {
        let content = file.content.to_lowercase();
        let mut hints: Vec<String> = self
            .categories
            .iter()
            .filter_map(|(category, keywords)| {
                keywords
                    .iter()
                    .find(|k| content.contains(k.as_str()))
                    .map(|k| category.hint(&file.path, k))
            })
            .collect();

        let has_added_line = content.lines().any(|l| l.starts_with('+') && !l.starts_with("+++"));
        if has_added_line && content.contains("time.") {
            hints.push(format!(
                "Timing optimization detected in {} - performance measurement or timeout handling",
                file.path
            ));
        }
        if content.contains("sync.") || content.contains("atomic.") {
            hints.push(format!(
                "Synchronization optimization detected in {} - concurrency safety improvement",
                file.path
            ));
        }

        hints
    }
}
