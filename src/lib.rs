/// Declared actions, their schema and their results.
pub mod action;

/// Command line surface.
pub mod cli;

/// Discovery of commands and their action files.
pub mod command;

/// Guards deciding whether action files and actions run.
pub mod condition;

/// Shared constants.
pub mod constants;

/// Filesystem and process side effects.
pub mod effects;

/// Orchestration of one command invocation.
pub mod engine;

/// Defines custom error types.
pub mod error;

/// Extension traits.
pub mod ext;

/// Front-matter parsing of action files.
pub mod frontmatter;

/// One handler per action kind.
pub mod handlers;

/// The command model and its populators.
pub mod model;

/// Answering `vars` questions.
pub mod prompt;

/// Template parsing and rendering functionality.
pub mod renderer;

/// Persisted role variables.
pub mod role;
