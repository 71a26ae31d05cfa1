#![allow(dead_code)]

use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use stencil::effects::OsEffects;
use stencil::engine::{ExecutionReport, Orchestrator};
use stencil::error::Result;
use stencil::prompt::AutomaticPrompter;
use stencil::renderer::MiniJinjaRenderer;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Copies a fixture project into a fresh temporary directory.
pub fn copy_project(fixture: impl AsRef<Path>) -> TempDir {
    let fixture = fixture.as_ref();
    let tmp = tempfile::tempdir().unwrap();
    for entry in WalkDir::new(fixture).into_iter().filter_map(|e| e.ok()) {
        let target = tmp.path().join(entry.path().strip_prefix(fixture).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    tmp
}

/// Writes `contents` at `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Runs a command non-interactively with the default populators.
pub fn run(
    root: &Path,
    noun: &str,
    verb: &str,
    options: &[(&str, &str)],
) -> Result<ExecutionReport> {
    let renderer = MiniJinjaRenderer::new();
    let prompter = AutomaticPrompter::new();
    let supplied: IndexMap<String, String> =
        options.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let result = Orchestrator::new(root, &renderer, &OsEffects, &prompter).execute(noun, verb, &supplied);
    result
}

/// Compares a project against its expected tree, ignoring the command
/// definitions themselves.
pub fn assert_tree(actual: &Path, expected: impl AsRef<Path>) {
    let spring = actual.join(".spring");
    let _ = fs::remove_dir_all(spring.join("commands"));
    if !spring.join("roles").exists() {
        let _ = fs::remove_dir_all(&spring);
    }
    let expected = expected.as_ref();
    let different = dir_diff::is_different(actual, expected).unwrap();
    if different {
        print_tree(actual);
    }
    assert!(!different, "{} differs from {}", actual.display(), expected.display());
}

fn print_tree(root: &Path) {
    for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            let contents = fs::read_to_string(entry.path()).unwrap_or_default();
            println!("--- {}\n{contents:?}", entry.path().strip_prefix(root).unwrap().display());
        }
    }
}
