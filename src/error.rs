use std::path::PathBuf;

use thiserror::Error;

use crate::toolchain::ToolStage;

/// Unified error type for py-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Invalid choice: '{0}'")]
    InvalidChoice(String),

    #[error("No scripted answer left for prompt: {0}")]
    PromptExhausted(String),

    #[error("Descriptor error in {}: {reason}", .path.display())]
    Descriptor { path: PathBuf, reason: String },

    #[error("{stage} failed: `{command}` exited with {}{}", code_label(.code), output_label(.output))]
    ToolFailed {
        stage: ToolStage,
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("{stage} failed: could not run `{command}`: {source}")]
    ToolSpawn {
        stage: ToolStage,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No artifacts found in {}", .0.display())]
    NoArtifacts(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

fn output_label(output: &str) -> String {
    if output.trim().is_empty() {
        String::new()
    } else {
        format!("\n{}", output.trim_end())
    }
}

/// Convenience type alias for Results in py-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a descriptor error for the given file
    pub fn descriptor(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ReleaseError::Descriptor {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
