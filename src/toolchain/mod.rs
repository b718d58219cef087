//! External tool invocation
//!
//! Every stage that shells out (tests, build, distribution check, upload)
//! goes through the [CommandRunner] trait, which returns a structured
//! [CommandOutcome]. [run_checked] invokes a command and checks its exit
//! status in one call.
//!
//! - [system::SystemRunner]: runs real processes with `std::process::Command`
//! - [fake::FakeRunner]: scripted outcomes for tests

pub mod fake;
pub mod system;

pub use fake::FakeRunner;
pub use system::SystemRunner;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ReleaseError, Result};

/// Workflow stage a tool runs in, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    Test,
    Build,
    Check,
    Upload,
}

impl fmt::Display for ToolStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolStage::Test => "Tests",
            ToolStage::Build => "Build",
            ToolStage::Check => "Distribution check",
            ToolStage::Upload => "Upload",
        };
        f.write_str(name)
    }
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Build a command from an argv list. The list must not be empty.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ReleaseError::config("tool command is empty"))?;
        Ok(ToolCommand {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Append path arguments (artifact files).
    pub fn with_paths(mut self, paths: &[PathBuf]) -> Self {
        self.args
            .extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        self
    }

    /// Append plain arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Last `lines` lines of stdout followed by stderr, for error reports.
    pub fn tail(&self, lines: usize) -> String {
        let combined: Vec<&str> = self
            .stdout
            .lines()
            .chain(self.stderr.lines())
            .filter(|line| !line.trim().is_empty())
            .collect();
        let start = combined.len().saturating_sub(lines);
        combined[start..].join("\n")
    }
}

/// Blocking execution of external tools.
pub trait CommandRunner {
    /// Run `command` in `cwd` and wait for it to exit.
    ///
    /// Returns `Err` only when the process could not be started; a non-zero
    /// exit is reported through [CommandOutcome::code].
    fn run(&self, command: &ToolCommand, cwd: &Path) -> std::io::Result<CommandOutcome>;

    /// Whether `program` can be found on the search path.
    fn is_available(&self, program: &str) -> bool;
}

/// Number of output lines carried into a failure message.
const FAILURE_TAIL_LINES: usize = 20;

/// Invoke a stage's command and fail unless it exits successfully.
pub fn run_checked<C: CommandRunner + ?Sized>(
    runner: &C,
    stage: ToolStage,
    command: &ToolCommand,
    cwd: &Path,
) -> Result<CommandOutcome> {
    info!(stage = %stage, command = %command, "running tool");

    let outcome = runner
        .run(command, cwd)
        .map_err(|source| ReleaseError::ToolSpawn {
            stage,
            command: command.to_string(),
            source,
        })?;

    debug!(stage = %stage, code = ?outcome.code, "tool finished");

    if !outcome.success() {
        return Err(ReleaseError::ToolFailed {
            stage,
            command: command.to_string(),
            code: outcome.code,
            output: outcome.tail(FAILURE_TAIL_LINES),
        });
    }
    Ok(outcome)
}
