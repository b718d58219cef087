use std::collections::VecDeque;

use super::Prompter;
use crate::error::{ReleaseError, Result};

/// One canned answer for [ScriptedPrompter].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    Confirm(bool),
    /// Raw menu answer as a user would type it, e.g. "1" or "9"
    Select(String),
    Input(String),
}

/// Prompter replaying a fixed script, for tests and non-interactive runs.
///
/// Answers are consumed in order. Running out of answers, or meeting an
/// answer of the wrong kind, is an error so an unexpected prompt fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<ScriptedAnswer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = ScriptedAnswer>) -> Self {
        ScriptedPrompter {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Prompts shown so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<ScriptedAnswer> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ReleaseError::PromptExhausted(prompt.to_string()))
    }
}

fn unexpected(prompt: &str, answer: ScriptedAnswer) -> ReleaseError {
    ReleaseError::PromptExhausted(format!("{} (script had {:?})", prompt, answer))
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        match self.next(prompt)? {
            ScriptedAnswer::Confirm(answer) => Ok(answer),
            other => Err(unexpected(prompt, other)),
        }
    }

    fn select_option(&mut self, prompt: &str, choices: &[String]) -> Result<usize> {
        match self.next(prompt)? {
            ScriptedAnswer::Select(answer) => match answer.trim().parse::<usize>() {
                Ok(index) if index >= 1 && index <= choices.len() => Ok(index - 1),
                _ => Err(ReleaseError::InvalidChoice(answer)),
            },
            other => Err(unexpected(prompt, other)),
        }
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            ScriptedAnswer::Input(text) => Ok(text.trim().to_string()),
            other => Err(unexpected(prompt, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order() {
        let mut p = ScriptedPrompter::new([
            ScriptedAnswer::Confirm(true),
            ScriptedAnswer::Select("2".to_string()),
            ScriptedAnswer::Input("3.0.0".to_string()),
        ]);
        let choices = vec!["a".to_string(), "b".to_string()];
        assert!(p.confirm("Continue?").unwrap());
        assert_eq!(p.select_option("Pick", &choices).unwrap(), 1);
        assert_eq!(p.input("Version").unwrap(), "3.0.0");
        assert_eq!(p.asked(), ["Continue?", "Pick", "Version"]);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn test_exhausted_script_errors() {
        let mut p = ScriptedPrompter::new([]);
        assert!(matches!(
            p.confirm("Upload?"),
            Err(ReleaseError::PromptExhausted(_))
        ));
    }

    #[test]
    fn test_wrong_answer_kind_errors() {
        let mut p = ScriptedPrompter::new([ScriptedAnswer::Input("x".to_string())]);
        assert!(p.confirm("Upload?").is_err());
    }

    #[test]
    fn test_invalid_selection() {
        let mut p = ScriptedPrompter::new([ScriptedAnswer::Select("9".to_string())]);
        let choices = vec!["a".to_string()];
        assert!(matches!(
            p.select_option("Pick", &choices),
            Err(ReleaseError::InvalidChoice(_))
        ));
    }
}
