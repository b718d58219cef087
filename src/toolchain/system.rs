use std::path::Path;
use std::process::Command;

use super::{CommandOutcome, CommandRunner, ToolCommand};

/// Runs tools as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand, cwd: &Path) -> std::io::Result<CommandOutcome> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .output()?;

        Ok(CommandOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
