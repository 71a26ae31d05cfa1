//! Every filesystem and process side effect performed by handlers goes
//! through [`Effects`], so handlers can run against [`MemoryEffects`] in
//! tests and [`OsEffects`] for real.

mod memory;
mod os;

pub use memory::MemoryEffects;
pub use os::OsEffects;

use crate::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Description of one subprocess invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSpec {
    /// Command line handed to the platform shell.
    pub command: String,
    /// Working directory of the process.
    pub dir: PathBuf,
    /// Text written to the process's stdin, which is closed afterwards.
    pub stdin: Option<String>,
    /// Redirects stdout into this file instead of capturing it.
    pub stdout_to: Option<PathBuf>,
    /// Redirects stderr into this file instead of capturing it.
    pub stderr_to: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Exited(i32),
    /// Terminated without an exit code, e.g. by a signal.
    Terminated,
}

impl ProcessStatus {
    pub fn success(&self) -> bool {
        matches!(self, ProcessStatus::Exited(0))
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Exited(code) => write!(f, "exit code {code}"),
            ProcessStatus::Terminated => f.write_str("termination without exit code"),
        }
    }
}

/// Captured result of a finished process. Redirected streams are empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub status: ProcessStatus,
    pub stdout: String,
    pub stderr: String,
}

pub trait Effects {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8: {e}", path.display()),
            )
            .into()
        })
    }

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Paths of the entries directly inside `dir`, sorted. A missing
    /// directory has no entries.
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Writes a whole file, creating parent directories. Readers observe
    /// either the previous content or the complete new content.
    fn write_text(&self, path: &Path, contents: &str) -> Result<()>;

    /// Replaces the content of an existing file through a temporary sibling,
    /// keeping the destination's permissions. The temporary file never
    /// outlives the call.
    fn replace_text(&self, path: &Path, contents: &str) -> Result<()>;

    /// Runs a process to completion or until its timeout expires.
    fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput>;
}
