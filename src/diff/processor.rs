//! Prioritization, truncation and chunking of parsed diffs.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::importance::ImportanceRules;
use super::types::{ChangeType, DiffSummary, FileChange};
use crate::context::ChangeContext;

pub const DEFAULT_MAX_CHUNK_SIZE: usize = 4000;
pub const DEFAULT_MAX_FILES: usize = 20;

/// A contiguous group of files sized for one prompt section.
#[derive(Debug, Clone, Serialize)]
pub struct DiffChunk {
    pub files: Vec<FileChange>,
    pub description: String,
    /// Combined content length in characters.
    pub size: usize,
}

/// A diff reduced to what fits in a prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDiff {
    pub summary: String,
    pub chunks: Vec<DiffChunk>,
    /// Files kept after truncation.
    pub total_files: usize,
    /// Line totals of the original diff.
    pub total_added: usize,
    pub total_deleted: usize,
    pub languages: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_context: Option<ChangeContext>,
    /// The unprocessed diff, kept for scope detection.
    #[serde(skip)]
    pub diff_summary: DiffSummary,
}

impl ProcessedDiff {
    pub fn with_change_context(mut self, context: ChangeContext) -> Self {
        self.change_context = Some(context);
        self
    }

    /// Files across all chunks, in priority order.
    pub fn files(&self) -> impl Iterator<Item = &FileChange> {
        self.chunks.iter().flat_map(|c| c.files.iter())
    }
}

/// Sorts, caps and chunks a [`DiffSummary`].
#[derive(Debug, Clone)]
pub struct DiffProcessor {
    max_chunk_size: usize,
    max_files: usize,
    importance: ImportanceRules,
}

impl Default for DiffProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MAX_FILES)
    }
}

impl DiffProcessor {
    /// Zero for either limit selects its default.
    pub fn new(max_chunk_size: usize, max_files: usize) -> Self {
        Self {
            max_chunk_size: if max_chunk_size == 0 { DEFAULT_MAX_CHUNK_SIZE } else { max_chunk_size },
            max_files: if max_files == 0 { DEFAULT_MAX_FILES } else { max_files },
            importance: ImportanceRules::default(),
        }
    }

    pub fn with_importance(mut self, importance: ImportanceRules) -> Self {
        self.importance = importance;
        self
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn process(&self, diff_summary: DiffSummary) -> ProcessedDiff {
        let mut files = self.prioritize(&diff_summary.files);
        if files.len() > self.max_files {
            debug!(
                dropped = files.len() - self.max_files,
                max_files = self.max_files,
                "Truncating diff to file cap"
            );
            files.truncate(self.max_files);
        }

        let languages = language_counts(&files);
        let summary = summarize(&files, &diff_summary);
        let total_files = files.len();
        let chunks = self.chunk(files);

        ProcessedDiff {
            summary,
            chunks,
            total_files,
            total_added: diff_summary.total_added,
            total_deleted: diff_summary.total_deleted,
            languages,
            change_context: None,
            diff_summary,
        }
    }

    /// Stable sort by change type, then importance (both descending), then
    /// line delta ascending.
    pub fn prioritize(&self, files: &[FileChange]) -> Vec<FileChange> {
        let mut sorted = files.to_vec();
        sorted.sort_by(|a, b| self.compare(a, b));
        sorted
    }

    fn compare(&self, a: &FileChange, b: &FileChange) -> Ordering {
        b.change_type
            .priority()
            .cmp(&a.change_type.priority())
            .then_with(|| self.importance.score(&b.path).cmp(&self.importance.score(&a.path)))
            .then_with(|| a.total_changes().cmp(&b.total_changes()))
    }

    /// Greedy packing; a file larger than the budget gets a chunk of its own.
    pub fn chunk(&self, files: Vec<FileChange>) -> Vec<DiffChunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<FileChange> = Vec::new();
        let mut current_size = 0;

        for file in files {
            let size = file.content.chars().count();
            if !current.is_empty() && current_size + size > self.max_chunk_size {
                chunks.push(make_chunk(std::mem::take(&mut current), current_size));
                current_size = 0;
            }
            current_size += size;
            current.push(file);
        }
        if !current.is_empty() {
            chunks.push(make_chunk(current, current_size));
        }

        chunks
    }
}

fn make_chunk(files: Vec<FileChange>, size: usize) -> DiffChunk {
    DiffChunk {
        description: describe_chunk(&files),
        files,
        size,
    }
}

fn describe_chunk(files: &[FileChange]) -> String {
    if let [file] = files {
        return format!(
            "{}: {} ({}+, {}-)",
            file.change_type, file.path, file.lines_added, file.lines_deleted
        );
    }

    let added: usize = files.iter().map(|f| f.lines_added).sum();
    let deleted: usize = files.iter().map(|f| f.lines_deleted).sum();
    format!(
        "{} files: {} ({}+, {}-)",
        files.len(),
        change_type_breakdown(files),
        added,
        deleted
    )
}

/// `"2 added, 1 modified"` in change-type priority order.
fn change_type_breakdown(files: &[FileChange]) -> String {
    ChangeType::ALL
        .iter()
        .filter_map(|ct| {
            let count = files.iter().filter(|f| f.change_type == *ct).count();
            (count > 0).then(|| format!("{count} {ct}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn language_counts(files: &[FileChange]) -> BTreeMap<String, usize> {
    let mut languages = BTreeMap::new();
    for file in files.iter().filter(|f| f.has_known_language()) {
        *languages.entry(file.language.clone()).or_insert(0) += 1;
    }
    languages
}

fn summarize(files: &[FileChange], original: &DiffSummary) -> String {
    if files.is_empty() {
        return "No changes detected".to_string();
    }

    let mut summary = format!(
        "Changes: {} files with {} additions and {} deletions",
        change_type_breakdown(files),
        original.total_added,
        original.total_deleted
    );

    let languages = language_counts(files);
    if !languages.is_empty() {
        let listed: Vec<String> = languages
            .iter()
            .map(|(lang, count)| format!("{lang} ({count})"))
            .collect();
        summary.push_str(&format!(". Languages: {}", listed.join(", ")));
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, change_type: ChangeType, added: usize, deleted: usize, content_len: usize) -> FileChange {
        FileChange {
            path: path.to_string(),
            old_path: None,
            change_type,
            lines_added: added,
            lines_deleted: deleted,
            content: "x".repeat(content_len),
            language: crate::diff::LanguageMap::default().detect(path),
        }
    }

    #[test]
    fn test_zero_limits_use_defaults() {
        let processor = DiffProcessor::new(0, 0);
        assert_eq!(processor.max_chunk_size(), DEFAULT_MAX_CHUNK_SIZE);
        assert_eq!(processor.max_files(), DEFAULT_MAX_FILES);
    }

    #[test]
    fn test_change_type_sorts_first() {
        let processor = DiffProcessor::default();
        let sorted = processor.prioritize(&[
            file("Cargo.toml", ChangeType::Modified, 1, 0, 10),
            file("src/new.rs", ChangeType::Added, 100, 0, 10),
            file("src/old.rs", ChangeType::Deleted, 0, 5, 10),
        ]);
        let paths: Vec<&str> = sorted.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/new.rs", "src/old.rs", "Cargo.toml"]);
    }

    #[test]
    fn test_importance_then_delta() {
        let processor = DiffProcessor::default();
        let sorted = processor.prioritize(&[
            file("src/big.rs", ChangeType::Modified, 50, 0, 10),
            file("src/small.rs", ChangeType::Modified, 1, 1, 10),
            file("config/app.yaml", ChangeType::Modified, 90, 0, 10),
        ]);
        let paths: Vec<&str> = sorted.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["config/app.yaml", "src/small.rs", "src/big.rs"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let processor = DiffProcessor::default();
        let sorted = processor.prioritize(&[
            file("src/b.rs", ChangeType::Modified, 2, 0, 10),
            file("src/a.rs", ChangeType::Modified, 1, 1, 10),
        ]);
        assert_eq!(sorted[0].path, "src/b.rs");
    }

    #[test]
    fn test_truncates_to_max_files() {
        let files = (0..30)
            .map(|i| file(&format!("src/f{i}.rs"), ChangeType::Modified, 1, 0, 10))
            .collect();
        let processed = DiffProcessor::new(100_000, 5).process(DiffSummary::from_files(files));

        assert_eq!(processed.total_files, 5);
        assert_eq!(processed.files().count(), 5);
        assert_eq!(processed.total_added, 30);
    }

    #[test]
    fn test_chunks_respect_budget() {
        let files = vec![
            file("a.rs", ChangeType::Modified, 1, 0, 40),
            file("b.rs", ChangeType::Modified, 2, 0, 40),
            file("c.rs", ChangeType::Modified, 3, 0, 40),
        ];
        let chunks = DiffProcessor::new(100, 20).chunk(files);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].size, 80);
        assert_eq!(chunks[1].size, 40);
        assert!(chunks.iter().all(|c| c.size <= 100));
    }

    #[test]
    fn test_oversized_file_gets_own_chunk() {
        let files = vec![
            file("small.rs", ChangeType::Modified, 1, 0, 10),
            file("huge.rs", ChangeType::Modified, 1, 0, 500),
            file("tail.rs", ChangeType::Modified, 1, 0, 10),
        ];
        let chunks = DiffProcessor::new(100, 20).chunk(files);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].files.len(), 1);
        assert_eq!(chunks[1].size, 500);
    }

    #[test]
    fn test_single_file_description() {
        let chunks = DiffProcessor::default().chunk(vec![file("main.go", ChangeType::Added, 80, 0, 10)]);
        assert_eq!(chunks[0].description, "added: main.go (80+, 0-)");
    }

    #[test]
    fn test_multi_file_description() {
        let chunks = DiffProcessor::default().chunk(vec![
            file("a.go", ChangeType::Added, 3, 0, 10),
            file("b.go", ChangeType::Modified, 2, 1, 10),
            file("c.go", ChangeType::Added, 1, 0, 10),
        ]);
        assert_eq!(chunks[0].description, "3 files: 2 added, 1 modified (6+, 1-)");
    }

    #[test]
    fn test_summary_text() {
        let processed = DiffProcessor::default().process(DiffSummary::from_files(vec![
            file("main.go", ChangeType::Added, 80, 0, 10),
            file("config.yaml", ChangeType::Modified, 1, 1, 10),
            file("Makefile", ChangeType::Modified, 2, 0, 10),
        ]));

        assert_eq!(
            processed.summary,
            "Changes: 1 added, 2 modified files with 83 additions and 1 deletions. Languages: Go (1), YAML (1)"
        );
        assert_eq!(processed.languages.len(), 2);
    }

    #[test]
    fn test_empty_summary_text() {
        let processed = DiffProcessor::default().process(DiffSummary::empty());
        assert_eq!(processed.summary, "No changes detected");
        assert!(processed.chunks.is_empty());
    }
}
