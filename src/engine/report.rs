use crate::action::{ActionResult, ActionStatus};
use crate::model::Model;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    /// Front-matter key of the action, e.g. `generate`.
    pub kind: &'static str,
    pub result: ActionResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// No front matter; the file is not an action file.
    NoFrontMatter,
    /// The file's `conditional` did not hold.
    GuardedOut,
    Executed(Vec<ActionReport>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// What a completed command did, and the model it left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub files: Vec<FileReport>,
    pub model: Model,
}

impl ExecutionReport {
    pub fn actions(&self) -> impl Iterator<Item = &ActionReport> {
        self.files
            .iter()
            .filter_map(|file| match &file.outcome {
                FileOutcome::Executed(actions) => Some(actions),
                _ => None,
            })
            .flatten()
    }

    /// Number of actions whose outcome was `status`.
    pub fn count(&self, status: ActionStatus) -> usize {
        self.actions().filter(|action| action.result.outcome == status).count()
    }
}
