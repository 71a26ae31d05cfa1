use super::{Effects, ProcessOutput, ProcessSpec, ProcessStatus};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// In-memory [`Effects`] for exercising handlers without touching disk.
///
/// Processes are not run: each call to [`Effects::run`] pops the next
/// scripted output and records the spec it was called with.
#[derive(Debug, Default)]
pub struct MemoryEffects {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    outputs: RefCell<VecDeque<ProcessOutput>>,
    runs: RefCell<Vec<ProcessSpec>>,
    writes: RefCell<usize>,
}

fn not_found(path: &Path) -> Error {
    std::io::Error::new(ErrorKind::NotFound, format!("{} does not exist", path.display())).into()
}

impl MemoryEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files.borrow_mut().insert(path.into(), contents.as_bytes().to_vec());
        self
    }

    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.dirs.borrow_mut().insert(path.into());
        self
    }

    /// Queues the output returned by the next process run.
    pub fn with_output(self, code: i32, stdout: &str, stderr: &str) -> Self {
        self.outputs.borrow_mut().push_back(ProcessOutput {
            status: ProcessStatus::Exited(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
        self
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .borrow()
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Every process spec passed to [`Effects::run`], in call order.
    pub fn runs(&self) -> Vec<ProcessSpec> {
        self.runs.borrow().clone()
    }

    /// Number of successful `write_text`/`replace_text` calls.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    fn store(&self, path: &Path, contents: &[u8]) {
        self.files.borrow_mut().insert(path.to_path_buf(), contents.to_vec());
        *self.writes.borrow_mut() += 1;
    }
}

impl Effects for MemoryEffects {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.files.borrow().get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
            || self.files.borrow().keys().any(|file| file.starts_with(path) && file != path)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.borrow();
        let dirs = self.dirs.borrow();
        let entries: BTreeSet<PathBuf> = files
            .keys()
            .chain(dirs.iter())
            .filter_map(|path| path.strip_prefix(dir).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| dir.join(first))
            .collect();
        Ok(entries.into_iter().collect())
    }

    fn write_text(&self, path: &Path, contents: &str) -> Result<()> {
        if self.is_dir(path) {
            return Err(std::io::Error::new(
                ErrorKind::Other,
                format!("{} is a directory", path.display()),
            )
            .into());
        }
        self.store(path, contents.as_bytes());
        Ok(())
    }

    fn replace_text(&self, path: &Path, contents: &str) -> Result<()> {
        if !self.files.borrow().contains_key(path) {
            return Err(not_found(path));
        }
        self.store(path, contents.as_bytes());
        Ok(())
    }

    fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput> {
        self.runs.borrow_mut().push(spec.clone());
        let mut output = self.outputs.borrow_mut().pop_front().ok_or_else(|| {
            Error::Unsupported(format!("no scripted output for '{}'", spec.command))
        })?;
        if let Some(target) = &spec.stdout_to {
            let stdout = std::mem::take(&mut output.stdout);
            self.files.borrow_mut().insert(target.clone(), stdout.into_bytes());
        }
        if let Some(target) = &spec.stderr_to {
            let stderr = std::mem::take(&mut output.stderr);
            self.files.borrow_mut().insert(target.clone(), stderr.into_bytes());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_implied_by_files() {
        let effects = MemoryEffects::new().with_file("/p/src/a.txt", "a");
        assert!(effects.is_dir(Path::new("/p/src")));
        assert!(!effects.is_dir(Path::new("/p/src/a.txt")));
        assert!(effects.exists(Path::new("/p")));
    }

    #[test]
    fn list_dir_returns_direct_children() {
        let effects = MemoryEffects::new()
            .with_file("/p/b.txt", "b")
            .with_file("/p/src/a.txt", "a")
            .with_dir("/p/empty");
        assert_eq!(
            effects.list_dir(Path::new("/p")).unwrap(),
            vec![PathBuf::from("/p/b.txt"), PathBuf::from("/p/empty"), PathBuf::from("/p/src")]
        );
        assert!(effects.list_dir(Path::new("/missing")).unwrap().is_empty());
    }

    #[test]
    fn run_pops_scripted_outputs_in_order() {
        let effects = MemoryEffects::new().with_output(0, "one", "").with_output(1, "", "two");
        let spec = ProcessSpec { command: "x".into(), ..Default::default() };
        assert_eq!(effects.run(&spec).unwrap().stdout, "one");
        assert_eq!(effects.run(&spec).unwrap().status, ProcessStatus::Exited(1));
        assert!(effects.run(&spec).is_err());
        assert_eq!(effects.runs().len(), 3);
    }
}
