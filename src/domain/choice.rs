use std::fmt;

use crate::domain::version::{split_prefix, Version, VersionBump};
use crate::error::{ReleaseError, Result};

/// Number of entries in the version menu.
pub const MENU_LEN: usize = 5;

/// The user's answer to the version menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpChoice {
    Patch,
    Minor,
    Major,
    /// Version entered verbatim by the user
    Custom(String),
    /// Keep the current version and leave descriptors untouched
    Skip,
}

impl BumpChoice {
    /// Map a zero-based menu index to a choice.
    ///
    /// The custom entry maps to an empty `Custom` which the caller fills in
    /// after asking for the version text.
    pub fn from_menu_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(BumpChoice::Patch),
            1 => Ok(BumpChoice::Minor),
            2 => Ok(BumpChoice::Major),
            3 => Ok(BumpChoice::Custom(String::new())),
            4 => Ok(BumpChoice::Skip),
            other => Err(ReleaseError::InvalidChoice((other + 1).to_string())),
        }
    }

    /// Whether this choice rewrites the descriptor files
    pub fn writes_descriptors(&self) -> bool {
        !matches!(self, BumpChoice::Skip)
    }

    fn as_bump(&self) -> Option<VersionBump> {
        match self {
            BumpChoice::Patch => Some(VersionBump::Patch),
            BumpChoice::Minor => Some(VersionBump::Minor),
            BumpChoice::Major => Some(VersionBump::Major),
            _ => None,
        }
    }
}

impl fmt::Display for BumpChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpChoice::Patch => f.write_str("patch"),
            BumpChoice::Minor => f.write_str("minor"),
            BumpChoice::Major => f.write_str("major"),
            BumpChoice::Custom(v) => write!(f, "custom ({})", v),
            BumpChoice::Skip => f.write_str("skip"),
        }
    }
}

/// Compute the new version string for a choice.
///
/// Bump choices require `current` to be a plain `X.Y.Z`, optionally with a
/// single `v` prefix that is kept on the result. Custom versions are accepted
/// as typed (trimmed) as long as they are not empty.
pub fn resolve_version(current: &str, choice: &BumpChoice) -> Result<String> {
    if let Some(bump) = choice.as_bump() {
        let cannot = |e: ReleaseError| {
            ReleaseError::version(format!(
                "cannot apply {} bump to '{}': {}",
                bump, current, e
            ))
        };
        let (prefix, _) = split_prefix(current.trim());
        let bumped = Version::parse(current)
            .and_then(|v| v.bump(bump))
            .map_err(cannot)?;
        return Ok(format!("{}{}", prefix, bumped));
    }

    match choice {
        BumpChoice::Custom(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(ReleaseError::version("custom version cannot be empty"));
            }
            Ok(text.to_string())
        }
        _ => Ok(current.to_string()),
    }
}

/// Human readable menu entries, previewing the result of each bump.
pub fn menu_labels(current: &str) -> Vec<String> {
    let preview = |choice: BumpChoice| match resolve_version(current, &choice) {
        Ok(new) => format!("{} ({} -> {})", choice, current, new),
        Err(_) => choice.to_string(),
    };

    vec![
        preview(BumpChoice::Patch),
        preview(BumpChoice::Minor),
        preview(BumpChoice::Major),
        "custom (enter a version)".to_string(),
        format!("skip (keep {})", current),
    ]
}

/// Whether a custom version follows semantic versioning.
pub fn is_semver(text: &str) -> bool {
    semver::Version::parse(text).is_ok()
}
