//! Version bump application.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use super::semantic::{PreReleaseKind, SemanticVersion};
use crate::error::VersionError;

/// Type of version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    Patch,
    Minor,
    Major,
}

impl BumpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpType::Patch => "patch",
            BumpType::Minor => "minor",
            BumpType::Major => "major",
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpType {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(BumpType::Major),
            "minor" => Ok(BumpType::Minor),
            "patch" => Ok(BumpType::Patch),
            _ => Err(VersionError::InvalidBump(s.to_string())),
        }
    }
}

/// Case-insensitive, so model output like `"Minor"` is accepted.
impl<'de> Deserialize<'de> for BumpType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| de::Error::unknown_variant(&s, &["major", "minor", "patch"]))
    }
}

/// Increment one component and reset the lower ones. Any pre-release suffix
/// is dropped.
pub fn apply_bump(version: &SemanticVersion, bump: BumpType) -> Result<SemanticVersion, VersionError> {
    let overflow = || VersionError::Overflow {
        version: version.to_string(),
        bump: bump.to_string(),
    };
    let bumped = match bump {
        BumpType::Major => SemanticVersion::new(version.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
        BumpType::Minor => {
            SemanticVersion::new(version.major, version.minor.checked_add(1).ok_or_else(overflow)?, 0)
        }
        BumpType::Patch => SemanticVersion::new(
            version.major,
            version.minor,
            version.patch.checked_add(1).ok_or_else(overflow)?,
        ),
    };
    Ok(bumped)
}

/// Next version from a recommendation. A forced bump replaces the
/// recommendation outright; a pre-release kind starts numbering at 1.
pub fn next_version(
    current: &SemanticVersion,
    recommended: BumpType,
    forced: Option<BumpType>,
    pre_release: Option<PreReleaseKind>,
) -> Result<SemanticVersion, VersionError> {
    let next = apply_bump(current, forced.unwrap_or(recommended))?;
    Ok(match pre_release {
        Some(kind) => next.with_pre_release(kind, Some(1)),
        None => next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bumps_reset_lower_components() {
        let base = SemanticVersion::new(1, 2, 3);
        assert_eq!(apply_bump(&base, BumpType::Major).unwrap(), SemanticVersion::new(2, 0, 0));
        assert_eq!(apply_bump(&base, BumpType::Minor).unwrap(), SemanticVersion::new(1, 3, 0));
        assert_eq!(apply_bump(&base, BumpType::Patch).unwrap(), SemanticVersion::new(1, 2, 4));
    }

    #[test]
    fn test_bump_overflow_is_an_error() {
        let base = SemanticVersion::new(1, u64::MAX, 7);
        assert_eq!(
            apply_bump(&base, BumpType::Minor).unwrap_err(),
            VersionError::Overflow {
                version: format!("1.{}.7", u64::MAX),
                bump: "minor".to_string(),
            }
        );
        assert_eq!(apply_bump(&base, BumpType::Major).unwrap(), SemanticVersion::new(2, 0, 0));
        let top = SemanticVersion::new(u64::MAX, 0, 0);
        assert!(next_version(&top, BumpType::Patch, Some(BumpType::Major), None).is_err());
    }

    #[test]
    fn test_forced_bump_overrides() {
        let next =
            next_version(&SemanticVersion::new(1, 2, 3), BumpType::Patch, Some(BumpType::Major), None).unwrap();
        assert_eq!(next, SemanticVersion::new(2, 0, 0));
    }

    #[test]
    fn test_pre_release_starts_at_one() {
        let next = next_version(
            &SemanticVersion::new(1, 2, 3),
            BumpType::Minor,
            None,
            Some(PreReleaseKind::Beta),
        )
        .unwrap();
        assert_eq!(next.to_string(), "1.3.0-beta.1");
    }

    #[test]
    fn test_bump_from_pre_release_drops_suffix() {
        let current: SemanticVersion = "1.3.0-beta.1".parse().unwrap();
        assert_eq!(apply_bump(&current, BumpType::Patch).unwrap().to_string(), "1.3.1");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("MAJOR".parse::<BumpType>().unwrap(), BumpType::Major);
        assert_eq!(
            "huge".parse::<BumpType>().unwrap_err(),
            VersionError::InvalidBump("huge".to_string())
        );
    }

    #[test]
    fn test_deserialize_case_insensitive() {
        let bump: BumpType = serde_json::from_str("\"Minor\"").unwrap();
        assert_eq!(bump, BumpType::Minor);
        assert!(serde_json::from_str::<BumpType>("\"giant\"").is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(BumpType::Major > BumpType::Minor);
        assert!(BumpType::Minor > BumpType::Patch);
    }
}
