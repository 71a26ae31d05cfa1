use super::manifest::{Command, CommandManifest};
use crate::constants::COMMAND_MANIFEST;
use crate::error::Result;
use crate::ext::PathExt;
use std::path::{Path, PathBuf};

/// A noun directory and the verbs below it.
#[derive(Debug, Clone, PartialEq)]
pub struct NounCommands {
    pub command: Command,
    pub verbs: Vec<Command>,
}

/// Discovers `<noun>/<verb>` directories under a commands directory.
pub struct CommandScanner {
    commands_dir: PathBuf,
}

impl CommandScanner {
    pub fn new(commands_dir: impl Into<PathBuf>) -> Self {
        Self { commands_dir: commands_dir.into() }
    }

    /// Every non-hidden noun with its verbs, both sorted by directory name.
    /// A missing commands directory yields nothing.
    pub fn scan(&self) -> Result<Vec<NounCommands>> {
        let mut nouns = Vec::new();
        for noun_dir in subdirectories(&self.commands_dir)? {
            let verbs = subdirectories(&noun_dir)?
                .iter()
                .map(|verb_dir| describe(verb_dir))
                .collect::<Result<Vec<_>>>()?;
            nouns.push(NounCommands { command: describe(&noun_dir)?, verbs });
        }
        Ok(nouns)
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && !path.is_hidden() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Reads the directory's manifest, defaulting the name to the directory
/// name and the description to "<name> commands".
pub(crate) fn describe(dir: &Path) -> Result<Command> {
    let manifest_path = dir.join(COMMAND_MANIFEST);
    let mut command = if manifest_path.is_file() {
        log::debug!("Found {COMMAND_MANIFEST} file in {}", manifest_path.display());
        CommandManifest::read(&manifest_path)?.command
    } else {
        Command::default()
    };
    let dir_name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    if command.description.is_none() {
        command.description = Some(format!("{dir_name} commands"));
    }
    if command.name.is_none() {
        command.name = Some(dir_name);
    }
    Ok(command)
}
