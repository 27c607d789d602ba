//! Change-set level classification.

use std::collections::BTreeMap;

use super::types::Signal;
use crate::diff::{ChangeType, FileChange};

/// Files needed before a modification-heavy change counts as refactoring.
const REFACTORING_MIN_FILES: usize = 3;

fn is_documentation(path: &str) -> bool {
    let lowered = path.to_lowercase();
    lowered.ends_with(".md") || lowered.ends_with(".txt") || lowered.contains("doc")
}

/// Histograms plus `likely_refactoring`, `likely_new_feature` and
/// `documentation_update` flags. Flags are only present when set.
pub fn classify_changes(files: &[FileChange]) -> BTreeMap<String, Signal> {
    let mut patterns = BTreeMap::new();

    let mut file_types = BTreeMap::new();
    for file in files.iter().filter(|f| !f.language.is_empty()) {
        *file_types.entry(file.language.clone()).or_insert(0) += 1;
    }
    patterns.insert("file_types".to_string(), Signal::Histogram(file_types));

    let mut change_types = BTreeMap::new();
    for file in files {
        *change_types.entry(file.change_type.to_string()).or_insert(0) += 1;
    }
    let count_of = |ct: ChangeType| change_types.get(ct.as_str()).copied().unwrap_or(0);
    let (added, modified) = (count_of(ChangeType::Added), count_of(ChangeType::Modified));

    if files.len() > REFACTORING_MIN_FILES && modified > added {
        patterns.insert("likely_refactoring".to_string(), Signal::Flag(true));
    }
    if added > modified {
        patterns.insert("likely_new_feature".to_string(), Signal::Flag(true));
    }
    patterns.insert("change_types".to_string(), Signal::Histogram(change_types));

    let doc_files = files.iter().filter(|f| is_documentation(&f.path)).count();
    if doc_files > 0 {
        patterns.insert("documentation_update".to_string(), Signal::Flag(true));
        patterns.insert("documentation_files".to_string(), Signal::Count(doc_files));
    }

    patterns
}
