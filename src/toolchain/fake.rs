use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{CommandOutcome, CommandRunner, ToolCommand};

#[derive(Debug, Clone, Default)]
struct Behavior {
    code: i32,
    output: String,
    creates: Vec<PathBuf>,
}

/// Scripted command runner for testing without real tools.
///
/// Every program succeeds with empty output unless configured otherwise.
/// Each invocation is recorded in order.
///
/// Behaviors are keyed either by program (`"twine"`) or by program and first
/// argument (`"twine upload"`). The more specific key wins.
#[derive(Debug, Default)]
pub struct FakeRunner {
    behaviors: HashMap<String, Behavior>,
    missing: HashSet<String>,
    invocations: RefCell<Vec<ToolCommand>>,
}

impl FakeRunner {
    /// Create a runner where every program succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` (`"program"` or `"program subcommand"`) exit with
    /// `code`, printing `output` to stdout
    pub fn fail(mut self, command: &str, code: i32, output: &str) -> Self {
        let behavior = self.behaviors.entry(command.to_string()).or_default();
        behavior.code = code;
        behavior.output = output.to_string();
        self
    }

    /// Make `program` unavailable: not on PATH and failing to spawn
    pub fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    /// Make `command` create files (relative to its working directory)
    pub fn creates(mut self, command: &str, files: &[&str]) -> Self {
        let behavior = self.behaviors.entry(command.to_string()).or_default();
        behavior
            .creates
            .extend(files.iter().map(PathBuf::from));
        self
    }

    /// All recorded invocations, oldest first
    pub fn invocations(&self) -> Vec<ToolCommand> {
        self.invocations.borrow().clone()
    }

    /// Whether any invocation matched `command` (`"program"` or
    /// `"program subcommand"`)
    pub fn ran(&self, command: &str) -> bool {
        self.invocations
            .borrow()
            .iter()
            .any(|cmd| matches_key(cmd, command))
    }

    fn behavior_for(&self, command: &ToolCommand) -> Behavior {
        command
            .args
            .first()
            .and_then(|arg| {
                self.behaviors
                    .get(&format!("{} {}", command.program, arg))
            })
            .or_else(|| self.behaviors.get(&command.program))
            .cloned()
            .unwrap_or_default()
    }
}

fn matches_key(command: &ToolCommand, key: &str) -> bool {
    let mut parts = key.split_whitespace();
    if parts.next() != Some(command.program.as_str()) {
        return false;
    }
    match parts.next() {
        Some(sub) => command.args.first().map(String::as_str) == Some(sub),
        None => true,
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &ToolCommand, cwd: &Path) -> io::Result<CommandOutcome> {
        if self.missing.contains(&command.program) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", command.program),
            ));
        }

        self.invocations.borrow_mut().push(command.clone());

        let behavior = self.behavior_for(command);

        for file in &behavior.creates {
            let path = cwd.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, b"artifact")?;
        }

        Ok(CommandOutcome {
            code: Some(behavior.code),
            stdout: behavior.output,
            stderr: String::new(),
        })
    }

    fn is_available(&self, program: &str) -> bool {
        !self.missing.contains(program)
    }
}
