use crate::error::{ReleaseError, Result};
use std::fmt;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string (e.g., "1.2.3" or "v1.2.3" -> Version(1,2,3))
    ///
    /// At most one leading `v`/`V` is accepted. Each component must be
    /// ASCII digits only.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let (_, clean) = split_prefix(trimmed);

        let parts: Vec<&str> = clean.split('.').collect();
        if parts.len() != 3 {
            return Err(ReleaseError::version(format!(
                "Invalid version format: '{}' - expected X.Y.Z",
                text
            )));
        }

        let component = |name: &str, part: &str| -> Result<u32> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ReleaseError::version(format!(
                    "Invalid {} version: '{}'",
                    name, part
                )));
            }
            part.parse::<u32>().map_err(|_| {
                ReleaseError::version(format!("{} version out of range: {}", name, part))
            })
        };

        Ok(Version {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }

    /// Bump version according to bump type
    ///
    /// Fails instead of wrapping when the bumped component would overflow.
    pub fn bump(&self, bump_type: VersionBump) -> Result<Self> {
        let overflow = || {
            ReleaseError::version(format!("{} bump of {} overflows", bump_type, self))
        };
        let bumped = match bump_type {
            VersionBump::Major => Version {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            VersionBump::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            VersionBump::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
            },
        };
        Ok(bumped)
    }
}

/// Split an optional single `v`/`V` prefix off a version string.
///
/// `"v1.2.3"` gives `("v", "1.2.3")`, `"1.2.3"` gives `("", "1.2.3")`.
pub fn split_prefix(text: &str) -> (&str, &str) {
    match text.strip_prefix(|c: char| c == 'v' || c == 'V') {
        Some(rest) => (&text[..1], rest),
        None => ("", text),
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        };
        f.write_str(name)
    }
}
