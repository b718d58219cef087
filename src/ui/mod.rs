//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `scripted` - Non-interactive prompter replaying canned answers
//! - This module - The [Prompter] trait and its terminal implementation

use std::io::{self, BufRead, Write};

use crate::error::{ReleaseError, Result};

pub mod formatter;
pub mod scripted;

pub use formatter::{
    display_artifacts, display_boundary_warning, display_dry_run_plan, display_error,
    display_manual_push_instruction, display_manual_upload_instruction, display_stage,
    display_status, display_success, display_version_change,
};
pub use scripted::{ScriptedAnswer, ScriptedPrompter};

/// Source of user decisions.
///
/// The workflow only talks to the user through this trait, so a scripted
/// implementation can stand in for the terminal in tests or CI.
pub trait Prompter {
    /// Ask a yes/no question. Anything but an explicit yes declines.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Ask the user to pick one of `choices`.
    ///
    /// # Returns
    /// * `Ok(usize)` - Zero-based index of the chosen entry
    /// * `Err(ReleaseError::InvalidChoice)` - If the answer is not a listed entry
    fn select_option(&mut self, prompt: &str, choices: &[String]) -> Result<usize>;

    /// Ask for free-form text, returned trimmed.
    fn input(&mut self, prompt: &str) -> Result<String>;
}

/// Prompter reading answers line by line from `input` and writing prompts to
/// `output`.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        TerminalPrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompter { input, output }
    }

    fn read_answer(&mut self) -> Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        write!(self.output, "\n{} (y/N): ", prompt)?;
        let response = self.read_answer()?.to_lowercase();
        Ok(response == "y" || response == "yes")
    }

    fn select_option(&mut self, prompt: &str, choices: &[String]) -> Result<usize> {
        writeln!(self.output, "\n{}", console::style(prompt).bold())?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, choice)?;
        }
        write!(self.output, "\nSelect an option (1-{}): ", choices.len())?;

        let answer = self.read_answer()?;
        match answer.parse::<usize>() {
            Ok(index) if index >= 1 && index <= choices.len() => Ok(index - 1),
            _ => Err(ReleaseError::InvalidChoice(answer)),
        }
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}: ", prompt)?;
        self.read_answer()
    }
}
