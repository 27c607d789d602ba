//! Parsing of `git show --numstat` output.

use tracing::debug;

use super::language::LanguageMap;
use super::types::{ChangeType, DiffSummary, FileChange};

/// Parse `added<TAB>deleted<TAB>path` lines into a summary.
///
/// Binary files report `-` for both counts and are recorded with zero lines.
/// Rename notation (`old => new`, `dir/{old => new}/file`) resolves to the new
/// path. Malformed lines are skipped.
pub fn parse_numstat(output: &str, languages: &LanguageMap) -> DiffSummary {
    let files = output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let change = parse_numstat_line(line, languages);
            if change.is_none() {
                debug!(line, "Skipping malformed numstat line");
            }
            change
        })
        .collect();

    DiffSummary::from_files(files)
}

fn parse_numstat_line(line: &str, languages: &LanguageMap) -> Option<FileChange> {
    let mut parts = line.splitn(3, '\t');
    let added = parse_count(parts.next()?)?;
    let deleted = parse_count(parts.next()?)?;
    let raw_path = parts.next()?.trim();
    if raw_path.is_empty() {
        return None;
    }

    let (path, old_path, change_type) = match resolve_rename(raw_path) {
        Some((old, new)) => (new, Some(old), ChangeType::Renamed),
        None => (raw_path.to_string(), None, ChangeType::Modified),
    };

    Some(FileChange {
        language: languages.detect(&path),
        path,
        old_path,
        change_type,
        lines_added: added,
        lines_deleted: deleted,
        content: String::new(),
    })
}

fn parse_count(field: &str) -> Option<usize> {
    match field.trim() {
        "-" => Some(0),
        n => n.parse().ok(),
    }
}

fn resolve_rename(path: &str) -> Option<(String, String)> {
    if !path.contains(" => ") {
        return None;
    }

    if let (Some(open), Some(close)) = (path.find('{'), path.find('}'))
        && open < close
    {
        let (prefix, suffix) = (&path[..open], &path[close + 1..]);
        let (old_mid, new_mid) = path[open + 1..close].split_once(" => ")?;
        let join = |mid: &str| format!("{prefix}{mid}{suffix}").replace("//", "/");
        return Some((join(old_mid), join(new_mid)));
    }

    let (old, new) = path.split_once(" => ")?;
    Some((old.to_string(), new.to_string()))
}
