//! Typed records produced by diff parsing.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language reported for files whose extension is not in the lookup table.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// How a file changed within a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl ChangeType {
    /// All change types, in prioritization order (most informative first).
    pub const ALL: [ChangeType; 5] = [
        ChangeType::Added,
        ChangeType::Deleted,
        ChangeType::Renamed,
        ChangeType::Modified,
        ChangeType::Copied,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Modified => "modified",
            ChangeType::Deleted => "deleted",
            ChangeType::Renamed => "renamed",
            ChangeType::Copied => "copied",
        }
    }

    /// Sort priority: added > deleted > renamed > modified > everything else.
    pub fn priority(&self) -> u8 {
        match self {
            ChangeType::Added => 4,
            ChangeType::Deleted => 3,
            ChangeType::Renamed => 2,
            ChangeType::Modified => 1,
            ChangeType::Copied => 0,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change to a single file, created once per diff section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    /// Source path for renames and copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    pub change_type: ChangeType,
    pub lines_added: usize,
    pub lines_deleted: usize,
    /// Raw diff text for this file.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub content: String,
    pub language: String,
}

impl FileChange {
    /// Total line delta (added + deleted).
    pub fn total_changes(&self) -> usize {
        self.lines_added + self.lines_deleted
    }

    /// Whether the language lookup found a match for this file.
    pub fn has_known_language(&self) -> bool {
        self.language != UNKNOWN_LANGUAGE && !self.language.is_empty()
    }
}

/// Ordered file changes plus aggregates.
///
/// Construct through [`DiffSummary::from_files`] so the totals always equal the
/// sum over `files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffSummary {
    pub files: Vec<FileChange>,
    pub total_added: usize,
    pub total_deleted: usize,
    pub total_files: usize,
    pub timestamp: DateTime<Utc>,
    /// Known-language file counts.
    pub languages: BTreeMap<String, usize>,
    /// Path to detected language, for every file.
    pub file_languages: BTreeMap<String, String>,
}

impl DiffSummary {
    pub fn from_files(files: Vec<FileChange>) -> Self {
        let total_added = files.iter().map(|f| f.lines_added).sum();
        let total_deleted = files.iter().map(|f| f.lines_deleted).sum();

        let mut languages = BTreeMap::new();
        let mut file_languages = BTreeMap::new();
        for file in &files {
            file_languages.insert(file.path.clone(), file.language.clone());
            if file.has_known_language() {
                *languages.entry(file.language.clone()).or_insert(0) += 1;
            }
        }

        Self {
            total_files: files.len(),
            files,
            total_added,
            total_deleted,
            timestamp: Utc::now(),
            languages,
            file_languages,
        }
    }

    pub fn empty() -> Self {
        Self::from_files(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}
