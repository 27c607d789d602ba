//! Unified diff text parsing.
//!
//! The input is whatever `git diff` printed. It is split into one section per
//! `diff --git` header and each section becomes a [`FileChange`]. Sections that
//! cannot be understood are logged and skipped, so parsing as a whole never
//! fails.

use tracing::{debug, warn};

use super::language::LanguageMap;
use super::types::{ChangeType, DiffSummary, FileChange};
use crate::error::DiffError;

const SECTION_HEADER: &str = "diff --git";

/// Parses raw unified diff text into a [`DiffSummary`].
#[derive(Debug, Clone, Default)]
pub struct DiffParser {
    languages: LanguageMap,
}

impl DiffParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_languages(languages: LanguageMap) -> Self {
        Self { languages }
    }

    pub fn languages(&self) -> &LanguageMap {
        &self.languages
    }

    /// Parse a complete diff. Empty or whitespace-only input yields an empty summary.
    pub fn parse(&self, diff_text: &str) -> DiffSummary {
        if diff_text.trim().is_empty() {
            return DiffSummary::empty();
        }

        let mut files = Vec::new();
        for section in split_sections(diff_text) {
            match self.parse_section(&section) {
                Ok(change) => files.push(change),
                Err(e) => warn!(error = %e, "Skipping unparseable diff section"),
            }
        }

        debug!(files = files.len(), "Parsed diff");
        DiffSummary::from_files(files)
    }

    /// Parse one `diff --git` section.
    pub fn parse_section(&self, section: &str) -> Result<FileChange, DiffError> {
        let mut lines = section.lines();
        let header = lines.next().ok_or(DiffError::MissingHeader)?;
        if !header.starts_with(SECTION_HEADER) {
            return Err(DiffError::MissingHeader);
        }

        let (mut old_path, mut new_path) =
            parse_header_paths(header).ok_or_else(|| DiffError::InvalidHeader(header.to_string()))?;

        let mut is_new = false;
        let mut is_deleted = false;
        let mut is_copy = false;
        let mut is_rename = false;
        let mut in_hunks = false;
        let mut lines_added = 0;
        let mut lines_deleted = 0;

        for line in lines {
            if in_hunks {
                if line.starts_with('+') && !line.starts_with("+++") {
                    lines_added += 1;
                } else if line.starts_with('-') && !line.starts_with("---") {
                    lines_deleted += 1;
                }
                continue;
            }

            if line.starts_with("@@") {
                in_hunks = true;
            } else if line.starts_with("new file mode") {
                is_new = true;
            } else if line.starts_with("deleted file mode") {
                is_deleted = true;
            } else if let Some(from) = line.strip_prefix("rename from ") {
                is_rename = true;
                old_path = from.trim().to_string();
            } else if let Some(to) = line.strip_prefix("rename to ") {
                is_rename = true;
                new_path = to.trim().to_string();
            } else if let Some(from) = line.strip_prefix("copy from ") {
                is_copy = true;
                old_path = from.trim().to_string();
            } else if let Some(to) = line.strip_prefix("copy to ") {
                is_copy = true;
                new_path = to.trim().to_string();
            }
        }

        let change_type = if is_new {
            ChangeType::Added
        } else if is_deleted {
            ChangeType::Deleted
        } else if is_copy {
            ChangeType::Copied
        } else if is_rename || old_path != new_path {
            ChangeType::Renamed
        } else {
            ChangeType::Modified
        };

        let old_path = matches!(change_type, ChangeType::Renamed | ChangeType::Copied).then_some(old_path);
        let language = self.languages.detect(&new_path);

        Ok(FileChange {
            path: new_path,
            old_path,
            change_type,
            lines_added,
            lines_deleted,
            content: section.to_string(),
            language,
        })
    }
}

/// Parse a diff with the default language table.
pub fn parse_diff(diff_text: &str) -> DiffSummary {
    DiffParser::new().parse(diff_text)
}

/// Split diff text into sections, each starting at a `diff --git` line.
/// Text before the first header is dropped.
pub fn split_sections(diff_text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut skipped_preamble = false;

    for line in diff_text.lines() {
        if line.starts_with(SECTION_HEADER) {
            if !current.is_empty() {
                sections.push(current.join("\n"));
            }
            current = vec![line];
        } else if current.is_empty() {
            skipped_preamble |= !line.trim().is_empty();
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    if skipped_preamble {
        debug!("Ignored text before first diff header");
    }
    sections
}

/// Extract `(old, new)` paths from a `diff --git a/<old> b/<new>` header.
fn parse_header_paths(header: &str) -> Option<(String, String)> {
    let rest = header.strip_prefix(SECTION_HEADER)?.trim();
    if rest.is_empty() {
        return None;
    }

    if let Some(stripped) = rest.strip_prefix("a/") {
        // Paths may contain spaces, so prefer the split where both sides agree.
        let splits: Vec<usize> = stripped.match_indices(" b/").map(|(i, _)| i).collect();
        let chosen = splits
            .iter()
            .copied()
            .find(|&i| stripped[..i] == stripped[i + 3..])
            .or_else(|| splits.last().copied());
        if let Some(i) = chosen {
            let (old, new) = (&stripped[..i], &stripped[i + 3..]);
            if !old.is_empty() && !new.is_empty() {
                return Some((old.to_string(), new.to_string()));
            }
        }
        return None;
    }

    // --no-prefix output
    let parts: Vec<&str> = rest.split_whitespace().collect();
    match parts.as_slice() {
        [old, new] => Some((old.to_string(), new.to_string())),
        _ => None,
    }
}
