use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::BumpChoice;

/// Position of a release in the workflow.
///
/// Every state except `Done` may be followed by `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    Start,
    GuardChecked,
    VersionRead,
    VersionSelected,
    VersionWritten,
    VersionSkipped,
    Tested,
    TestsSkipped,
    Built,
    Validated,
    Uploaded,
    /// The user declined a prompt that ends the workflow early
    UserAborted,
    Committed,
    CommitSkipped,
    Tagged,
    TagSkipped,
    Pushed,
    PushSkipped,
    Done,
    Aborted,
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything the workflow learns and changes while it runs.
///
/// Passed by reference through every stage. After an abort it still
/// describes how far the release got, including any files already rewritten.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub root: PathBuf,
    /// Descriptor the current version was read from
    pub version_source: Option<PathBuf>,
    pub current_version: Option<String>,
    pub choice: Option<BumpChoice>,
    pub new_version: Option<String>,
    /// Descriptor paths rewritten, relative to `root`
    pub written_files: Vec<PathBuf>,
    /// Built artifacts, relative to `root`
    pub artifacts: Vec<PathBuf>,
    pub commit_id: Option<String>,
    pub tag: Option<String>,
    pub pushed: bool,
    history: Vec<ReleaseState>,
}

impl ReleaseContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ReleaseContext {
            root: root.into(),
            version_source: None,
            current_version: None,
            choice: None,
            new_version: None,
            written_files: Vec::new(),
            artifacts: Vec::new(),
            commit_id: None,
            tag: None,
            pushed: false,
            history: vec![ReleaseState::Start],
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Latest state reached
    pub fn state(&self) -> ReleaseState {
        self.history
            .last()
            .copied()
            .unwrap_or(ReleaseState::Start)
    }

    /// Every state reached so far, oldest first
    pub fn history(&self) -> &[ReleaseState] {
        &self.history
    }

    pub fn has_reached(&self, state: ReleaseState) -> bool {
        self.history.contains(&state)
    }

    pub fn advance(&mut self, state: ReleaseState) {
        debug!(from = %self.state(), to = %state, "release state");
        self.history.push(state);
    }

    pub fn abort(&mut self) {
        if self.state() != ReleaseState::Aborted {
            self.advance(ReleaseState::Aborted);
        }
    }
}
