//! Tag listing records.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::debug;

use super::history::GIT_ISO_DATE;
use crate::version::SemanticVersion;

/// Format string handed to `git tag -l --format=`.
pub const TAG_LIST_FORMAT: &str = "%(refname:short)|%(objectname)|%(creatordate:iso)|%(contents:subject)";

/// A git tag with its version, when the name is a semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitTag {
    pub name: String,
    pub version: Option<SemanticVersion>,
    pub hash: String,
    pub date: DateTime<FixedOffset>,
    pub message: String,
    pub is_annotated: bool,
}

/// Parse `name|hash|date|subject` lines. Annotation status is not part of the
/// listing and starts out `false`.
pub fn parse_tag_list(output: &str) -> Vec<GitTag> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let tag = parse_tag_record(line);
            if tag.is_none() {
                debug!(record = line, "Skipping malformed tag record");
            }
            tag
        })
        .collect()
}

fn parse_tag_record(line: &str) -> Option<GitTag> {
    let mut fields = line.splitn(4, '|');
    let name = fields.next()?.trim();
    let hash = fields.next()?.trim();
    let date = fields.next()?.trim();
    let message = fields.next().unwrap_or_default().trim();

    if name.is_empty() || hash.is_empty() {
        return None;
    }

    let version = SemanticVersion::from_tag(name);
    if version.is_none() {
        debug!(tag = name, "Tag is not a semantic version");
    }

    Some(GitTag {
        name: name.to_string(),
        version,
        hash: hash.to_string(),
        date: DateTime::parse_from_str(date, GIT_ISO_DATE).ok()?,
        message: message.to_string(),
        is_annotated: false,
    })
}

/// Highest semantic version among `tags`, or `0.0.0` when none parse.
pub fn latest_version(tags: &[GitTag]) -> SemanticVersion {
    tags.iter()
        .filter_map(|t| t.version)
        .max()
        .unwrap_or_else(SemanticVersion::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "v1.10.0|aaa111|2024-05-01 12:00:00 +0000|Release 1.10.0\n\
                           v1.9.0|bbb222|2024-04-01 12:00:00 +0000|Release 1.9.0\n\
                           nightly|ccc333|2024-04-15 12:00:00 +0000|\n\
                           v2.0.0-rc.1|ddd444|2024-05-10 12:00:00 +0000|Release candidate | final";

    #[test]
    fn test_parse_tag_list() {
        let tags = parse_tag_list(LISTING);

        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0].version, Some(SemanticVersion::new(1, 10, 0)));
        assert_eq!(tags[2].name, "nightly");
        assert_eq!(tags[2].version, None);
        assert_eq!(tags[3].message, "Release candidate | final");
        assert!(tags.iter().all(|t| !t.is_annotated));
    }

    #[test]
    fn test_latest_version_uses_semantic_ordering() {
        let tags = parse_tag_list(LISTING);
        // 2.0.0-rc.1 is newer than 1.10.0, and 1.10.0 newer than 1.9.0.
        assert_eq!(latest_version(&tags).to_string(), "2.0.0-rc.1");
        assert_eq!(latest_version(&tags[..2]).to_string(), "1.10.0");
    }

    #[test]
    fn test_latest_version_defaults_to_zero() {
        let tags = parse_tag_list("nightly|ccc333|2024-04-15 12:00:00 +0000|");
        assert_eq!(latest_version(&tags), SemanticVersion::zero());
        assert_eq!(latest_version(&[]), SemanticVersion::zero());
    }

    #[test]
    fn test_malformed_records_skipped() {
        let tags = parse_tag_list("v1.0.0\n|abc|2024-01-01 00:00:00 +0000|x\nv1.0.0|abc|not a date|x");
        assert!(tags.is_empty());
    }
}
