//! Dialoguer-based implementation of [`QuestionPrompter`]

use super::{default_answer, QuestionPrompter};
use crate::{action::Question, error::Result};
use dialoguer::{Confirm, FuzzySelect, Input, Password, Select};

/// Lists longer than this get a fuzzy filter.
const FUZZY_THRESHOLD: usize = 10;

/// Prompts on the terminal.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionPrompter for DialoguerPrompter {
    fn ask(&self, question: &Question, choices: &[String]) -> Result<Option<String>> {
        if question.kind == "dropdown" {
            return self.prompt_choice(question, choices);
        }
        let attributes = question.attributes.clone().unwrap_or_default();
        if attributes.confirmation {
            let default = default_answer(question).is_some_and(|d| d == "true");
            let confirmed =
                Confirm::new().with_prompt(&question.label).default(default).interact()?;
            return Ok(Some(confirmed.to_string()));
        }
        if attributes.mask_character.is_some() {
            return Ok(Some(Password::new().with_prompt(&question.label).interact()?));
        }
        self.prompt_text(&question.label, default_answer(question))
    }
}

impl DialoguerPrompter {
    fn prompt_text(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let answer = input.interact_text()?;
        Ok(Some(answer))
    }

    fn prompt_choice(&self, question: &Question, choices: &[String]) -> Result<Option<String>> {
        if choices.is_empty() {
            log::warn!("Question '{}' has no options to choose from", question.name);
            return Ok(None);
        }
        let default_index = default_answer(question)
            .and_then(|d| choices.iter().position(|choice| choice == d))
            .unwrap_or(0);

        let selection = if choices.len() > FUZZY_THRESHOLD {
            FuzzySelect::new()
                .with_prompt(&question.label)
                .items(choices)
                .default(default_index)
                .interact_opt()?
        } else {
            Select::new()
                .with_prompt(&question.label)
                .items(choices)
                .default(default_index)
                .interact_opt()?
        };
        Ok(selection.map(|index| choices[index].clone()))
    }
}
