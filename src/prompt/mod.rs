//! Collaborators answering the questions of `vars` actions.
//!
//! - `dialoguer`: interactive terminal prompts
//! - `automatic`: predefined answers and defaults, for non-interactive runs

use crate::{action::Question, error::Result};

pub mod automatic;
pub mod dialoguer;

pub use self::automatic::AutomaticPrompter;
pub use self::dialoguer::DialoguerPrompter;

/// Answers one question at a time, blocking until an answer is available.
pub trait QuestionPrompter {
    /// Asks `question`. `choices` lists the selectable items of a dropdown
    /// and is empty for free input. `None` means the question went
    /// unanswered and nothing is recorded for it.
    fn ask(&self, question: &Question, choices: &[String]) -> Result<Option<String>>;
}

/// Default value declared in the question's attributes.
pub(crate) fn default_answer(question: &Question) -> Option<&str> {
    question.attributes.as_ref().and_then(|a| a.default_value.as_deref())
}

/// Convenience function to create the prompter for the current mode
pub fn get_prompter(interactive: bool) -> Box<dyn QuestionPrompter> {
    if interactive {
        Box::new(DialoguerPrompter::new())
    } else {
        Box::new(AutomaticPrompter::new())
    }
}
