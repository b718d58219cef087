use std::fmt;

/// Non-fatal conditions met during a release.
/// These are reported to the user but do not stop the workflow on their own.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The working tree has uncommitted changes
    DirtyWorkingTree { files: Vec<String> },
    /// The test runner is not installed, tests are skipped
    TestRunnerUnavailable { program: String },
    /// A custom version does not follow semantic versioning
    NonSemverVersion { version: String },
    /// The release tag already exists and will not be recreated
    TagExists { tag: String },
    /// HEAD is detached, only the tag can be pushed
    DetachedHead,
}

/// Number of dirty files listed before summarizing the rest.
const DIRTY_FILES_SHOWN: usize = 5;

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::DirtyWorkingTree { files } => {
                write!(f, "Working tree has {} uncommitted change(s)", files.len())?;
                for file in files.iter().take(DIRTY_FILES_SHOWN) {
                    write!(f, "\n    {}", file)?;
                }
                if files.len() > DIRTY_FILES_SHOWN {
                    write!(f, "\n    ... and {} more", files.len() - DIRTY_FILES_SHOWN)?;
                }
                Ok(())
            }
            BoundaryWarning::TestRunnerUnavailable { program } => {
                write!(f, "'{}' not found, skipping tests", program)
            }
            BoundaryWarning::NonSemverVersion { version } => {
                write!(
                    f,
                    "Version '{}' is not a semantic version (X.Y.Z); using it as entered",
                    version
                )
            }
            BoundaryWarning::TagExists { tag } => {
                write!(f, "Tag '{}' already exists, not creating it again", tag)
            }
            BoundaryWarning::DetachedHead => {
                write!(f, "HEAD is detached; only the tag will be pushed")
            }
        }
    }
}
