use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::error::VersionError;

/// A browser version, compared on major and minor components.
///
/// Patch components in the source string are accepted and ignored;
/// browser targeting data never distinguishes patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    /// Creates a version from major and minor components.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidVersion(s.to_string());
        let mut parts = s.trim().splitn(3, '.');

        let major = parts
            .next()
            .filter(|p| !p.is_empty())
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| invalid())?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };

        Ok(Self { major, minor })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A range of browser versions a polyfill applies to.
///
/// Ranges use the notation of the upstream browser-support data:
/// `*` (any version), `<11`, `<=10.1`, `>=9`, `4 - 11` (inclusive span),
/// or a bare version for an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRange {
    Any,
    Below(Version),
    AtMost(Version),
    AtLeast(Version),
    Between(Version, Version),
}

impl VersionRange {
    /// Returns true if the given version falls inside this range.
    pub fn matches(&self, version: Version) -> bool {
        match self {
            VersionRange::Any => true,
            VersionRange::Below(v) => version < *v,
            VersionRange::AtMost(v) => version <= *v,
            VersionRange::AtLeast(v) => version >= *v,
            VersionRange::Between(lo, hi) => version >= *lo && version <= *hi,
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || VersionError::InvalidRange(s.to_string());

        if s == "*" {
            return Ok(VersionRange::Any);
        }
        if let Some(rest) = s.strip_prefix("<=") {
            return rest.parse().map(VersionRange::AtMost).map_err(|_| invalid());
        }
        if let Some(rest) = s.strip_prefix('<') {
            return rest.parse().map(VersionRange::Below).map_err(|_| invalid());
        }
        if let Some(rest) = s.strip_prefix(">=") {
            return rest
                .parse()
                .map(VersionRange::AtLeast)
                .map_err(|_| invalid());
        }
        if let Some((lo, hi)) = s.split_once(" - ") {
            let lo = lo.parse().map_err(|_| invalid())?;
            let hi = hi.parse().map_err(|_| invalid())?;
            return Ok(VersionRange::Between(lo, hi));
        }

        let exact: Version = s.parse().map_err(|_| invalid())?;
        Ok(VersionRange::Between(exact, exact))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Any => write!(f, "*"),
            VersionRange::Below(v) => write!(f, "<{v}"),
            VersionRange::AtMost(v) => write!(f, "<={v}"),
            VersionRange::AtLeast(v) => write!(f, ">={v}"),
            VersionRange::Between(lo, hi) if lo == hi => write!(f, "{lo}"),
            VersionRange::Between(lo, hi) => write!(f, "{lo} - {hi}"),
        }
    }
}

// Ranges serialize as their string notation so catalog data round-trips
// through JSON in the same shape the upstream support data uses.
impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_major_only() {
        assert_eq!("54".parse::<Version>().unwrap(), Version::new(54, 0));
    }

    #[test]
    fn test_version_parse_major_minor() {
        assert_eq!("10.1".parse::<Version>().unwrap(), Version::new(10, 1));
    }

    #[test]
    fn test_version_parse_ignores_patch() {
        assert_eq!("11.2.3".parse::<Version>().unwrap(), Version::new(11, 2));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!("".parse::<Version>().is_err());
        assert!("abc".parse::<Version>().is_err());
        assert!("1.x".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(9, 9) < Version::new(10, 0));
        assert!(Version::new(10, 1) > Version::new(10, 0));
        assert_eq!(Version::new(10, 0), "10".parse().unwrap());
    }

    #[test]
    fn test_range_any() {
        let range: VersionRange = "*".parse().unwrap();
        assert!(range.matches(Version::new(0, 1)));
        assert!(range.matches(Version::new(999, 0)));
    }

    #[test]
    fn test_range_below() {
        let range: VersionRange = "<54".parse().unwrap();
        assert!(range.matches(Version::new(53, 9)));
        assert!(!range.matches(Version::new(54, 0)));
    }

    #[test]
    fn test_range_at_most() {
        let range: VersionRange = "<=10.1".parse().unwrap();
        assert!(range.matches(Version::new(10, 1)));
        assert!(!range.matches(Version::new(10, 2)));
    }

    #[test]
    fn test_range_at_least() {
        let range: VersionRange = ">=12".parse().unwrap();
        assert!(range.matches(Version::new(12, 0)));
        assert!(!range.matches(Version::new(11, 9)));
    }

    #[test]
    fn test_range_between() {
        let range: VersionRange = "4 - 11".parse().unwrap();
        assert!(range.matches(Version::new(4, 0)));
        assert!(range.matches(Version::new(11, 0)));
        assert!(!range.matches(Version::new(11, 1)));
        assert!(!range.matches(Version::new(3, 9)));
    }

    #[test]
    fn test_range_exact() {
        let range: VersionRange = "11".parse().unwrap();
        assert!(range.matches(Version::new(11, 0)));
        assert!(!range.matches(Version::new(11, 1)));
    }

    #[test]
    fn test_range_invalid() {
        assert!(">>4".parse::<VersionRange>().is_err());
        assert!("x - y".parse::<VersionRange>().is_err());
    }

    #[test]
    fn test_range_display_round_trip() {
        for notation in ["*", "<54", "<=10.1", ">=12", "4 - 11", "11.2"] {
            let range: VersionRange = notation.parse().unwrap();
            assert_eq!(range.to_string(), notation);
        }
    }

    #[test]
    fn test_range_serde_as_string() {
        let range: VersionRange = "<54".parse().unwrap();
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#""<54""#);
        let back: VersionRange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, range);
    }
}
