//! Prompter that answers without user interaction.

use super::{default_answer, QuestionPrompter};
use crate::{action::Question, error::Result};
use std::collections::HashMap;

/// Answers from predefined responses, then from the question's default
/// value, then (for dropdowns) with the first choice.
/// Useful for automation, testing, or CI environments.
#[derive(Debug, Default)]
pub struct AutomaticPrompter {
    answers: HashMap<String, String>,
}

impl AutomaticPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined answer for the question named `name`
    pub fn with_answer(mut self, name: &str, answer: &str) -> Self {
        self.answers.insert(name.to_string(), answer.to_string());
        self
    }
}

impl QuestionPrompter for AutomaticPrompter {
    fn ask(&self, question: &Question, choices: &[String]) -> Result<Option<String>> {
        let answer = self
            .answers
            .get(&question.name)
            .map(String::as_str)
            .or_else(|| default_answer(question))
            .or_else(|| choices.first().map(String::as_str));
        if answer.is_none() {
            log::info!("No answer for question '{}', skipping", question.name);
        }
        Ok(answer.map(str::to_string))
    }
}
