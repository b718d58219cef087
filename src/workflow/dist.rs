//! Build output housekeeping: clearing stale outputs before a build and
//! collecting the artifacts it produced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::is_project_subdir;

/// Remove previous build outputs under `root`: the dist directory, `build/`
/// and any top-level `*.egg-info` directory. Missing entries are fine.
///
/// # Returns
/// The removed paths, relative to `root`
///
/// # Errors
/// `InvalidInput` when `dist_dir` is not a plain subdirectory of `root`.
pub fn clean_build_outputs(root: &Path, dist_dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !is_project_subdir(dist_dir) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "refusing to clean '{}': not a subdirectory of the project",
                dist_dir.display()
            ),
        ));
    }

    let mut targets = vec![dist_dir.to_path_buf(), PathBuf::from("build")];

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(".egg-info") && entry.file_type()?.is_dir() {
            targets.push(PathBuf::from(name));
        }
    }

    let mut removed = Vec::new();
    for target in targets {
        let path = root.join(&target);
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
            debug!(path = %target.display(), "removed build output");
            removed.push(target);
        }
    }
    Ok(removed)
}

/// List the files in the dist directory, sorted by name.
///
/// # Returns
/// Paths relative to `root` (e.g. `dist/pkg-1.0.0.tar.gz`). Empty when the
/// directory does not exist.
pub fn collect_artifacts(root: &Path, dist_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let dist = root.join(dist_dir);
    if !dist.is_dir() {
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for entry in fs::read_dir(&dist)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            artifacts.push(dist_dir.join(entry.file_name()));
        }
    }
    artifacts.sort();
    Ok(artifacts)
}
