//! Domain logic - pure release rules independent of git, files and tools

pub mod choice;
pub mod tag;
pub mod version;

pub use choice::{menu_labels, resolve_version, BumpChoice};
pub use tag::TagPattern;
pub use version::{Version, VersionBump};
