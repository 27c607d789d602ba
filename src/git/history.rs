//! Commit history records.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::debug;

/// Format string handed to `git log --pretty=format:`.
pub const COMMIT_LOG_FORMAT: &str = "%H|%s|%an|%ad|%f";

/// Date layout produced by `git log --date=iso`.
pub(crate) const GIT_ISO_DATE: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub hash: String,
    pub subject: String,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    /// Filename-safe form of the subject.
    pub slug: String,
}

impl CommitInfo {
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }
}

/// Parse `hash|subject|author|date|slug` lines, newest first as git prints them.
///
/// The subject may itself contain `|`, so author, date and slug are taken from
/// the end of the record. Records that do not parse are skipped.
pub fn parse_commit_log(output: &str) -> Vec<CommitInfo> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let commit = parse_commit_record(line);
            if commit.is_none() {
                debug!(record = line, "Skipping malformed commit record");
            }
            commit
        })
        .collect()
}

fn parse_commit_record(line: &str) -> Option<CommitInfo> {
    let (hash, rest) = line.split_once('|')?;
    let mut tail = rest.rsplitn(4, '|');
    let slug = tail.next()?;
    let date = tail.next()?;
    let author = tail.next()?;
    let subject = tail.next()?;

    let hash = hash.trim();
    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    Some(CommitInfo {
        hash: hash.to_string(),
        subject: subject.trim().to_string(),
        author: author.trim().to_string(),
        date: DateTime::parse_from_str(date.trim(), GIT_ISO_DATE).ok()?,
        slug: slug.trim().to_string(),
    })
}
