//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the Git operations
//! a release needs, allowing for a real repository backed by `git2` and a
//! mock implementation for testing.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A recording mock for workflow tests
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use py_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> py_release::Result<()> {
//! if !repo.uncommitted_files()?.is_empty() {
//!     println!("working tree is dirty");
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::PathBuf;

use crate::error::Result;

/// Git operations used by the release workflow
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to [crate::error::ReleaseError].
pub trait Repository {
    /// List working tree paths with uncommitted changes, including untracked
    /// files. Ignored files are not reported.
    fn uncommitted_files(&self) -> Result<Vec<String>>;

    /// Name of the checked out branch, `None` when HEAD is detached or unborn
    fn current_branch(&self) -> Result<Option<String>>;

    /// Add files to the index
    ///
    /// # Arguments
    /// * `paths` - Absolute paths inside the working tree
    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()>;

    /// Commit the index on top of HEAD
    ///
    /// # Returns
    /// * `Ok(String)` - The new commit id
    fn commit(&self, message: &str) -> Result<String>;

    /// Whether a tag with this name already exists
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create a lightweight tag on HEAD
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Push a branch and/or a tag to a remote
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    /// * `branch` - Local branch to push
    /// * `tag` - Tag name to push
    fn push(&self, remote: &str, branch: Option<&str>, tag: Option<&str>) -> Result<()>;
}
