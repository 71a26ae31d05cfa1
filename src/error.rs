use std::path::PathBuf;
use thiserror::Error;

use crate::effects::ProcessStatus;
use crate::engine::Stage;
use crate::frontmatter::Diagnostic;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to walk directory. Original error: {0}")]
    WalkDirError(#[from] walkdir::Error),

    #[error("Failed to parse YAML. Original error: {0}")]
    YAMLParseError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON. Original error: {0}")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to render. Original error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Prompt failed. Original error: {0}")]
    PromptError(#[from] dialoguer::Error),

    /// The header of an action file could not be deserialized.
    #[error("{0}")]
    FrontMatter(Diagnostic),

    /// The header deserialized but does not describe a usable action.
    #[error("Invalid action in '{path}': {reason}")]
    InvalidAction { path: String, reason: String },

    /// A guard expression failed or produced something other than a boolean.
    #[error("Conditional expression '{expression}' {reason}")]
    Condition { expression: String, reason: String },

    #[error("Could not generate file '{}'. Original error: {source}", path.display())]
    Generate {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("Inject action can not be performed on '{}': {reason}", path.display())]
    Inject { path: PathBuf, reason: String },

    /// When the command has executed but finished with an error.
    #[error("Command '{command}' failed with {status}")]
    ExecFailed { command: String, status: ProcessStatus },

    #[error("Command '{command}' did not finish within {seconds} seconds")]
    ExecTimeout { command: String, seconds: u64 },

    #[error("JSON path '{expression}' {reason}")]
    JsonPath { expression: String, reason: String },

    #[error("Role file '{}' could not be updated: {reason}", path.display())]
    Role { path: PathBuf, reason: String },

    #[error("Cannot proceed: command '{noun} {verb}' not found in '{dir}'.")]
    CommandNotFound { noun: String, verb: String, dir: String },

    #[error("No command action files found to process in directory '{dir}'.")]
    NoActionFiles { dir: String },

    #[error("Missing required option '{name}' for command '{command}'.")]
    MissingOption { name: String, command: String },

    #[error("Invalid value '{value}' for option '{name}': {reason}.")]
    InvalidOption { name: String, value: String, reason: String },

    #[error("Unsupported: {0}.")]
    Unsupported(String),

    /// Aggregate raised by the orchestrator when one action file fails.
    #[error("Action file '{}' failed while {stage} ({action}): {source}", path.display())]
    ActionFailed {
        path: PathBuf,
        stage: Stage,
        action: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias for Results with stencil's Error as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(crate::constants::exit_codes::FAILURE);
}
