//! Protocol version filter applied to directory entries.

use super::ParseProtocolVersionError;
use std::fmt;
use std::str::FromStr;

/// The `<major>.<minor>` protocol line a catalog accepts.
///
/// A declared version is accepted when it starts with `<major>.<minor>.`,
/// so a target of `1.3` accepts `1.3.0` and `1.3.2` but not `1.30.0` or
/// a bare `1.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersionTarget {
    major: u32,
    minor: u32,
}

impl ProtocolVersionTarget {
    /// Creates a target from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns whether `version` belongs to this protocol line.
    #[must_use]
    pub fn accepts(&self, version: &str) -> bool {
        version
            .trim()
            .starts_with(&format!("{}.{}.", self.major, self.minor))
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }
}

impl Default for ProtocolVersionTarget {
    fn default() -> Self {
        Self::new(1, 3)
    }
}

impl FromStr for ProtocolVersionTarget {
    type Err = ParseProtocolVersionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseProtocolVersionError(value.to_owned());
        let mut parts = value.trim().split('.');
        let major = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(invalid)?;
        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for ProtocolVersionTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}", self.major, self.minor)
    }
}
