use super::manifest::Command;
use super::scanner::describe;
use crate::constants::{COMMANDS_DIR, COMMAND_MANIFEST, SPRING_DIR, TEXT_SNIFF_LEN};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::model::{infer_value, Model};
use indexmap::IndexMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A verb directory and the action files it holds.
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    pub noun: String,
    pub verb: String,
    pub dir: PathBuf,
    pub command: Command,
    /// Candidate action files, sorted by path.
    pub action_files: Vec<PathBuf>,
}

/// `<root>/.spring/commands`
pub fn commands_dir(root: &Path) -> PathBuf {
    root.join(SPRING_DIR).join(COMMANDS_DIR)
}

/// Finds `<root>/.spring/commands/<noun>/<verb>` and lists its action files.
pub fn resolve(root: &Path, noun: &str, verb: &str) -> Result<ResolvedCommand> {
    let commands = commands_dir(root);
    let dir = commands.join(noun).join(verb);
    if !dir.is_dir() {
        return Err(Error::CommandNotFound {
            noun: noun.to_string(),
            verb: verb.to_string(),
            dir: commands.display().to_string(),
        });
    }
    let command = describe(&dir)?;
    let action_files = action_files(&dir)?;
    log::debug!("Resolved {} action file(s) in {}", action_files.len(), dir.display());
    Ok(ResolvedCommand {
        noun: noun.to_string(),
        verb: verb.to_string(),
        dir,
        command,
        action_files,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.path().is_hidden()
}

/// Regular, non-hidden files below `dir` that look like text, except the
/// command manifest.
pub fn action_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() == COMMAND_MANIFEST {
            continue;
        }
        if looks_like_text(entry.path())? {
            files.push(entry.into_path());
        } else {
            log::debug!("Skipping binary file {}", entry.path().display());
        }
    }
    files.sort();
    Ok(files)
}

fn looks_like_text(path: &Path) -> Result<bool> {
    let mut head = Vec::with_capacity(TEXT_SNIFF_LEN);
    File::open(path)?.take(TEXT_SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(!head.contains(&0))
}

/// Seeds the model with option values: the supplied value, else the
/// declared default. Undeclared supplied values are inferred.
pub fn seed_options(
    command: &Command,
    supplied: &IndexMap<String, String>,
    model: &mut Model,
) -> Result<()> {
    let command_name = command.name.clone().unwrap_or_default();
    for option in &command.options {
        let raw = supplied.get(&option.name).or(option.default_value.as_ref());
        match raw {
            Some(raw) => {
                model.set(option.name.clone(), option.convert(raw)?);
            }
            None if option.required => {
                return Err(Error::MissingOption {
                    name: option.name.clone(),
                    command: command_name,
                })
            }
            None => {}
        }
    }
    for (name, raw) in supplied {
        if !command.options.iter().any(|option| &option.name == name) {
            model.set(name.clone(), infer_value(raw));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::manifest::CommandOption;
    use serde_json::json;
    use std::fs;

    #[test]
    fn lists_text_files_recursively_in_path_order() {
        let tmp = tempfile::tempdir().unwrap();
        let verb = tmp.path().join(".spring/commands/demo/new");
        fs::create_dir_all(verb.join("nested")).unwrap();
        fs::create_dir_all(verb.join(".git")).unwrap();
        fs::write(verb.join("b.yaml"), "---\n").unwrap();
        fs::write(verb.join("a.yaml"), "---\n").unwrap();
        fs::write(verb.join("nested/c.txt"), "text").unwrap();
        fs::write(verb.join(".hidden.yaml"), "---\n").unwrap();
        fs::write(verb.join(".git/config"), "x").unwrap();
        fs::write(verb.join("command.yaml"), "command:\n  name: new\n").unwrap();
        fs::write(verb.join("logo.png"), [0x89u8, b'P', b'N', b'G', 0, 0]).unwrap();

        let resolved = resolve(tmp.path(), "demo", "new").unwrap();

        let names: Vec<_> = resolved
            .action_files
            .iter()
            .map(|p| p.strip_prefix(&verb).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, ["a.yaml", "b.yaml", "nested/c.txt"]);
        assert_eq!(resolved.command.name.as_deref(), Some("new"));
    }

    #[test]
    fn unknown_command_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve(tmp.path(), "demo", "missing").unwrap_err();
        assert!(matches!(err, Error::CommandNotFound { .. }));
    }

    #[test]
    fn seeds_supplied_values_and_defaults() {
        let command = Command {
            name: Some("new".to_string()),
            options: vec![
                CommandOption {
                    name: "port".to_string(),
                    data_type: Some("int".to_string()),
                    default_value: Some("8080".to_string()),
                    ..Default::default()
                },
                CommandOption {
                    name: "feature".to_string(),
                    required: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let supplied = IndexMap::from([
            ("feature".to_string(), "orders".to_string()),
            ("extra".to_string(), "true".to_string()),
        ]);
        let mut model = Model::new();

        seed_options(&command, &supplied, &mut model).unwrap();

        assert_eq!(model.get("port"), Some(&json!(8080)));
        assert_eq!(model.get("feature"), Some(&json!("orders")));
        assert_eq!(model.get("extra"), Some(&json!(true)));

        let err = seed_options(&command, &IndexMap::new(), &mut Model::new()).unwrap_err();
        assert!(matches!(err, Error::MissingOption { .. }));
    }
}
