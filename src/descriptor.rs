//! Version descriptors: files that embed the package version.
//!
//! Reading extracts the version from a keyed assignment. Writing is a
//! two-phase read-modify-write: every descriptor is parsed and checked
//! against the expected current version first, and only then are the
//! rewritten contents flushed to disk. A descriptor that does not hold the
//! current version is reported instead of being silently left alone.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::{DescriptorConfig, DescriptorKind};
use crate::error::{ReleaseError, Result};

fn pattern(kind: DescriptorKind) -> &'static Regex {
    static SETUP_PY: OnceLock<Regex> = OnceLock::new();
    static PYPROJECT: OnceLock<Regex> = OnceLock::new();
    static VERSION_MODULE: OnceLock<Regex> = OnceLock::new();

    // The version value is always capture group 1.
    let (cell, source) = match kind {
        DescriptorKind::SetupPy => (&SETUP_PY, r#"\bversion\s*=\s*['"]([^'"\n]*)['"]"#),
        DescriptorKind::Pyproject => (&PYPROJECT, r#"(?m)^\s*version\s*=\s*['"]([^'"\n]*)['"]"#),
        DescriptorKind::VersionModule => (
            &VERSION_MODULE,
            r#"(?m)^__version__\s*=\s*['"]([^'"\n]*)['"]"#,
        ),
    };
    cell.get_or_init(|| Regex::new(source).expect("descriptor pattern is valid"))
}

/// Byte ranges of every version value assigned in `content`.
fn version_spans(kind: DescriptorKind, content: &str) -> Vec<Range<usize>> {
    pattern(kind)
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.range())
        .collect()
}

/// Extract the first version assigned in `content`.
pub fn parse_version(kind: DescriptorKind, content: &str) -> Option<String> {
    version_spans(kind, content)
        .first()
        .map(|span| content[span.clone()].to_string())
}

/// Replace every assignment of `current` with `new`.
///
/// Returns `None` when no assignment holds `current`. Assignments holding
/// other values are left untouched.
pub fn rewrite_version(
    kind: DescriptorKind,
    content: &str,
    current: &str,
    new: &str,
) -> Option<String> {
    let spans: Vec<_> = version_spans(kind, content)
        .into_iter()
        .filter(|span| &content[span.clone()] == current)
        .collect();
    if spans.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(content.len() + spans.len() * new.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&content[last..span.start]);
        out.push_str(new);
        last = span.end;
    }
    out.push_str(&content[last..]);
    Some(out)
}

/// Read the current version from the version source descriptor.
///
/// Uses `source` when given. Otherwise the first descriptor that exists on
/// disk under `root` and holds a version assignment; a `setup.py` that only
/// forwards `__version__` is passed over this way.
pub fn read_current_version(
    root: &Path,
    descriptors: &[DescriptorConfig],
    source: Option<&Path>,
) -> Result<(PathBuf, String)> {
    if let Some(source) = source {
        let descriptor = descriptors
            .iter()
            .find(|d| d.path == source)
            .ok_or_else(|| ReleaseError::descriptor(source, "not a configured descriptor"))?;

        let content = read_descriptor(root, descriptor)?;
        let version = parse_version(descriptor.kind, &content).ok_or_else(|| {
            ReleaseError::descriptor(&descriptor.path, "no version assignment found")
        })?;

        debug!(path = %descriptor.path.display(), version = %version, "read current version");
        return Ok((descriptor.path.clone(), version));
    }

    for descriptor in descriptors {
        if !root.join(&descriptor.path).is_file() {
            continue;
        }
        let content = read_descriptor(root, descriptor)?;
        match parse_version(descriptor.kind, &content) {
            Some(version) => {
                debug!(path = %descriptor.path.display(), version = %version, "read current version");
                return Ok((descriptor.path.clone(), version));
            }
            None => {
                debug!(path = %descriptor.path.display(), "no version assignment, trying next descriptor")
            }
        }
    }

    Err(ReleaseError::descriptor(
        root,
        "no descriptor in the project holds a version assignment",
    ))
}

fn read_descriptor(root: &Path, descriptor: &DescriptorConfig) -> Result<String> {
    fs::read_to_string(root.join(&descriptor.path))
        .map_err(|e| ReleaseError::descriptor(&descriptor.path, format!("cannot read: {}", e)))
}

/// A descriptor rewrite that has been validated but not yet written.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub path: PathBuf,
    contents: String,
}

/// Validate every descriptor and prepare its rewritten contents.
///
/// Nothing is written. Optional descriptors that are missing, or that hold no
/// version assignment at all, are skipped. An assignment holding any other
/// version is an error.
pub fn plan_version_update(
    root: &Path,
    descriptors: &[DescriptorConfig],
    current: &str,
    new: &str,
) -> Result<Vec<PendingWrite>> {
    let mut pending = Vec::new();

    for descriptor in descriptors {
        let path = root.join(&descriptor.path);
        if !path.is_file() {
            if descriptor.optional {
                debug!(path = %descriptor.path.display(), "skipping missing optional descriptor");
                continue;
            }
            return Err(ReleaseError::descriptor(
                &descriptor.path,
                "file does not exist",
            ));
        }

        let content = read_descriptor(root, descriptor)?;

        let Some(contents) = rewrite_version(descriptor.kind, &content, current, new) else {
            match parse_version(descriptor.kind, &content) {
                Some(found) => {
                    return Err(ReleaseError::descriptor(
                        &descriptor.path,
                        format!("expected version '{}', found '{}'", current, found),
                    ));
                }
                None if descriptor.optional => {
                    debug!(path = %descriptor.path.display(), "skipping optional descriptor without a version assignment");
                    continue;
                }
                None => {
                    return Err(ReleaseError::descriptor(
                        &descriptor.path,
                        format!("expected version '{}', no version assignment", current),
                    ));
                }
            }
        };

        pending.push(PendingWrite {
            path: descriptor.path.clone(),
            contents,
        });
    }

    if pending.is_empty() {
        return Err(ReleaseError::descriptor(
            root,
            "none of the configured descriptors has a version to update",
        ));
    }
    Ok(pending)
}

/// Flush planned rewrites to disk, returning the relative paths written.
pub fn apply_version_update(root: &Path, pending: Vec<PendingWrite>) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(pending.len());
    for write in pending {
        fs::write(root.join(&write.path), write.contents)?;
        info!(path = %write.path.display(), "updated version");
        written.push(write.path);
    }
    Ok(written)
}
