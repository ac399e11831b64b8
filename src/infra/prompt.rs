use crate::domain::errors::BundleError;
use crate::domain::models::SelectionDecision;
use log::debug;
use std::io::{BufRead, Write};

pub trait Prompter {
    /// Blocks until the operator gives one of `allowed`, returned trimmed and lowercased.
    fn prompt(&mut self, question: &str, allowed: &[&str]) -> Result<String, BundleError>;
}

pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> std::io::Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn prompt(&mut self, question: &str, allowed: &[&str]) -> Result<String, BundleError> {
        loop {
            let answer = self
                .ask(question)
                .map_err(BundleError::PromptIo)?
                .ok_or(BundleError::InputClosed)?;

            if allowed.contains(&answer.as_str()) {
                return Ok(answer);
            }

            debug!("Rejected answer {:?}", answer);
            writeln!(
                self.output,
                "Invalid choice. Please enter one of {}.",
                allowed.join(", ")
            )
            .map_err(BundleError::PromptIo)?;
        }
    }
}

/// Answers "y" to everything, for unattended runs.
pub struct AutoPrompter;

impl Prompter for AutoPrompter {
    fn prompt(&mut self, question: &str, allowed: &[&str]) -> Result<String, BundleError> {
        debug!("Auto-answering: {}", question.trim());
        Ok(allowed
            .iter()
            .find(|a| **a == "y")
            .or_else(|| allowed.first())
            .map(|a| a.to_string())
            .unwrap_or_default())
    }
}

pub fn ask_decision(
    prompter: &mut dyn Prompter,
    question: &str,
) -> Result<SelectionDecision, BundleError> {
    loop {
        let answer = prompter.prompt(question, &SelectionDecision::ANSWERS)?;
        if let Some(decision) = SelectionDecision::from_answer(&answer) {
            return Ok(decision);
        }
    }
}

pub fn confirm(prompter: &mut dyn Prompter, question: &str) -> Result<bool, BundleError> {
    Ok(prompter.prompt(question, &["y", "n"])? == "y")
}
