//! Splits action files into a YAML header and a template body.

mod hints;
mod reader;

pub use reader::{decode, parse, read_file};

use crate::action::Header;
use std::fmt;
use std::path::PathBuf;

/// A parsed action file.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionFile {
    pub path: PathBuf,
    pub header: Header,
    /// Lines after the closing delimiter, joined with `\n`.
    pub text: String,
}

/// Outcome of reading a file that may or may not carry front matter.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontMatter {
    Absent,
    Present(ActionFile),
}

/// Location and likely cause of a header that failed to deserialize.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub path: PathBuf,
    /// 1-based line in the file, when the YAML parser reported one.
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not read action file '{}'", self.path.display())?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " at line {line}, column {column}")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, ". {hint}")?;
        }
        Ok(())
    }
}
