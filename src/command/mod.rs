//! Command discovery: `<root>/.spring/commands/<noun>/<verb>` directories,
//! their optional manifests and the action files they hold.

pub mod manifest;
pub mod resolver;
pub mod scanner;

pub use manifest::{Command, CommandManifest, CommandOption};
pub use resolver::{action_files, commands_dir, resolve, seed_options, ResolvedCommand};
pub use scanner::{CommandScanner, NounCommands};
