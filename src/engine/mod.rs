//! Runs a resolved command: builds the model once, then parses, guards,
//! renders and dispatches every action file in order, stopping at the
//! first fatal error.

mod orchestrator;
mod report;

pub use orchestrator::Orchestrator;
pub use report::{ActionReport, ExecutionReport, FileOutcome, FileReport};

use std::fmt;

/// Where the orchestration was when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scanning,
    ModelBuilding,
    Parsing,
    Guarding,
    Rendering,
    Dispatching,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scanning => "scanning",
            Stage::ModelBuilding => "building the model",
            Stage::Parsing => "parsing",
            Stage::Guarding => "evaluating conditions",
            Stage::Rendering => "rendering",
            Stage::Dispatching => "dispatching",
        };
        f.write_str(name)
    }
}
