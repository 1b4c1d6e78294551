use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Serialization version negotiated by a caller, `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    major: u16,
    minor: u16,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid version '{input}': expected <major>[.<minor>]")]
pub struct VersionParseError {
    input: String,
}

impl Version {
    /// Version assumed when none is requested.
    pub const BASELINE: Version = Version::new(1, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError {
            input: input.to_string(),
        };
        let trimmed = input.trim();
        let (major, minor) = match trimmed.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (trimmed, "0"),
        };
        let major = major.parse::<u16>().map_err(|_| err())?;
        let minor = minor.parse::<u16>().map_err(|_| err())?;
        Ok(Self { major, minor })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_major_and_minor() {
        assert_eq!("2.0".parse::<Version>().unwrap(), Version::new(2, 0));
        assert_eq!(" 1.5 ".parse::<Version>().unwrap(), Version::new(1, 5));
        assert_eq!("3".parse::<Version>().unwrap(), Version::new(3, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("two".parse::<Version>().is_err());
        assert!("2.x".parse::<Version>().is_err());
        assert!("1.0.0".parse::<Version>().is_err());
    }

    #[test]
    fn orders_numerically() {
        assert!(Version::new(1, 10) > Version::new(1, 9));
        assert!(Version::new(2, 0) > Version::new(1, 99));
        assert_eq!(Version::default(), Version::BASELINE);
        assert_eq!(Version::new(2, 0).to_string(), "2.0");
    }
}
