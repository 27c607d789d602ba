//! Semantic version identifiers with alpha/beta/rc pre-releases.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Serialize, Serializer};

use crate::error::VersionError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:-([a-zA-Z]+)(?:\.(\d+))?)?$").expect("Invalid regex")
});

/// Pre-release channel, ordered alpha < beta < rc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseKind {
    Alpha,
    Beta,
    Rc,
}

impl PreReleaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreReleaseKind::Alpha => "alpha",
            PreReleaseKind::Beta => "beta",
            PreReleaseKind::Rc => "rc",
        }
    }
}

impl fmt::Display for PreReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreReleaseKind {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alpha" => Ok(PreReleaseKind::Alpha),
            "beta" => Ok(PreReleaseKind::Beta),
            "rc" => Ok(PreReleaseKind::Rc),
            _ => Err(VersionError::InvalidPreRelease(s.to_string())),
        }
    }
}

/// Pre-release suffix. Field order gives the derived ordering: kind first,
/// then number, with a missing number before any present one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub kind: PreReleaseKind,
    pub number: Option<u64>,
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{}.{n}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl FromStr for PreRelease {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, number) = match s.split_once('.') {
            Some((kind, n)) => {
                let n = n.parse().map_err(|_| VersionError::InvalidPreRelease(s.to_string()))?;
                (kind, Some(n))
            }
            None => (s, None),
        };
        Ok(PreRelease {
            kind: kind.parse()?,
            number,
        })
    }
}

/// `MAJOR.MINOR.PATCH[-pre[.N]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<PreRelease>,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
        }
    }

    /// Baseline used when no tag parses.
    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn with_pre_release(mut self, kind: PreReleaseKind, number: Option<u64>) -> Self {
        self.pre_release = Some(PreRelease { kind, number });
        self
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    /// Tag form: the version prefixed with `v`.
    pub fn tag_name(&self) -> String {
        format!("v{self}")
    }

    /// Parse a tag name, tolerating a leading `v`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let caps = VERSION_RE
            .captures(raw)
            .ok_or_else(|| VersionError::ParseFailed(s.to_string()))?;

        let number = |i: usize| -> Result<u64, VersionError> {
            caps.get(i)
                .map(|m| m.as_str())
                .unwrap_or_default()
                .parse()
                .map_err(|_| VersionError::ParseFailed(s.to_string()))
        };

        let pre_release = match caps.get(4) {
            Some(kind) => {
                let kind = kind
                    .as_str()
                    .parse()
                    .map_err(|_| VersionError::ParseFailed(s.to_string()))?;
                let pre_number = match caps.get(5) {
                    Some(_) => Some(number(5)?),
                    None => None,
                };
                Some(PreRelease {
                    kind,
                    number: pre_number,
                })
            }
            None => None,
        };

        Ok(SemanticVersion {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre_release,
        })
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TryFrom<semver::Version> for SemanticVersion {
    type Error = VersionError;

    fn try_from(version: semver::Version) -> Result<Self, Self::Error> {
        if !version.build.is_empty() {
            return Err(VersionError::Unsupported(version.to_string()));
        }
        let pre_release = if version.pre.is_empty() {
            None
        } else {
            Some(
                version
                    .pre
                    .as_str()
                    .parse::<PreRelease>()
                    .map_err(|_| VersionError::Unsupported(version.to_string()))?,
            )
        };

        Ok(SemanticVersion {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre_release,
        })
    }
}
