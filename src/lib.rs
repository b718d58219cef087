pub mod boundary;
pub mod config;
pub mod descriptor;
pub mod domain;
pub mod error;
pub mod git;
pub mod toolchain;
pub mod ui;
pub mod workflow;

pub use error::{ReleaseError, Result};
