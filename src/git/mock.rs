use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;

/// Mock repository for testing without actual git operations
///
/// Staged paths, commits, tags and pushes are recorded so tests can assert
/// on what the workflow did.
pub struct MockRepository {
    dirty_files: Vec<String>,
    branch: Option<String>,
    remotes: HashSet<String>,
    staged: RefCell<Vec<PathBuf>>,
    commits: RefCell<Vec<String>>,
    tags: RefCell<Vec<String>>,
    pushes: RefCell<Vec<(String, Option<String>, Option<String>)>>,
}

impl MockRepository {
    /// Create a clean mock repository on branch "main" with an "origin" remote
    pub fn new() -> Self {
        MockRepository {
            dirty_files: Vec::new(),
            branch: Some("main".to_string()),
            remotes: HashSet::from(["origin".to_string()]),
            staged: RefCell::new(Vec::new()),
            commits: RefCell::new(Vec::new()),
            tags: RefCell::new(Vec::new()),
            pushes: RefCell::new(Vec::new()),
        }
    }

    /// Report a file with uncommitted changes
    pub fn add_dirty_file(&mut self, path: impl Into<String>) {
        self.dirty_files.push(path.into());
    }

    /// Add an existing tag
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.get_mut().push(name.into());
    }

    /// Set the checked out branch (`None` for detached HEAD)
    pub fn set_branch(&mut self, branch: Option<&str>) {
        self.branch = branch.map(str::to_string);
    }

    /// Remove all remotes so pushes fail
    pub fn clear_remotes(&mut self) {
        self.remotes.clear();
    }

    pub fn staged(&self) -> Vec<PathBuf> {
        self.staged.borrow().clone()
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.tags.borrow().clone()
    }

    /// Recorded pushes as (remote, branch, tag)
    pub fn pushes(&self) -> Vec<(String, Option<String>, Option<String>)> {
        self.pushes.borrow().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn uncommitted_files(&self) -> Result<Vec<String>> {
        Ok(self.dirty_files.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        self.staged.borrow_mut().extend(paths.iter().cloned());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let mut commits = self.commits.borrow_mut();
        commits.push(message.to_string());
        Ok(format!("{:040x}", commits.len()))
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tags.borrow().iter().any(|t| t == name))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        if self.tag_exists(name)? {
            return Err(ReleaseError::Git(git2::Error::from_str(&format!(
                "tag '{}' already exists",
                name
            ))));
        }
        self.tags.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn push(&self, remote: &str, branch: Option<&str>, tag: Option<&str>) -> Result<()> {
        if !self.remotes.contains(remote) {
            return Err(ReleaseError::Git(git2::Error::from_str(&format!(
                "remote '{}' does not exist",
                remote
            ))));
        }
        self.pushes.borrow_mut().push((
            remote.to_string(),
            branch.map(str::to_string),
            tag.map(str::to_string),
        ));
        Ok(())
    }
}
