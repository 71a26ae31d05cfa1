use super::{hints, ActionFile, Diagnostic, FrontMatter};
use crate::action::RawHeader;
use crate::effects::Effects;
use crate::error::{Error, Result};
use std::path::Path;

const DELIMITER: char = '-';
const FALLBACK_DELIMITER: char = '~';

struct Sections {
    header: String,
    body: String,
}

fn is_delimiter(line: &str, delimiter: char) -> bool {
    let line = line.trim_end();
    line.len() >= 3 && line.chars().all(|c| c == delimiter)
}

/// Splits at the first two delimiter lines. `None` when the first line is
/// not a delimiter or the header is never closed.
fn split(contents: &str, delimiter: char) -> Option<Sections> {
    let mut lines = contents.lines();
    if !is_delimiter(lines.next()?, delimiter) {
        return None;
    }
    let mut header = String::new();
    loop {
        let line = lines.next()?;
        if is_delimiter(line, delimiter) {
            break;
        }
        header.push_str(line);
        header.push('\n');
    }
    let body = lines.collect::<Vec<_>>().join("\n");
    Some(Sections { header, body })
}

fn diagnostic(path: &Path, header: &str, err: serde_yaml::Error) -> Error {
    let location = err.location();
    // The header starts on the line after the opening delimiter.
    let header_line = location.as_ref().map(|l| l.line());
    Error::FrontMatter(Diagnostic {
        path: path.to_path_buf(),
        line: header_line.map(|line| line + 1),
        column: location.as_ref().map(|l| l.column()),
        message: err.to_string(),
        hint: hints::hint_for(header, header_line),
    })
}

fn parse_with(contents: &str, path: &Path, delimiter: char) -> Option<Result<ActionFile>> {
    let Sections { header, body } = split(contents, delimiter)?;
    let parsed = if header.trim().is_empty() {
        Err(Error::InvalidAction {
            path: path.display().to_string(),
            reason: "the front matter is empty".to_string(),
        })
    } else {
        serde_yaml::from_str::<RawHeader>(&header)
            .map_err(|e| diagnostic(path, &header, e))
            .and_then(|raw| raw.into_header(&path.display().to_string()))
    };
    Some(parsed.map(|header| ActionFile { path: path.to_path_buf(), header, text: body }))
}

/// Parses action file contents. Content without a leading delimiter line
/// has no front matter, which is not an error.
///
/// `---` delimiters are tried first. When that fails, `~~~` delimiters are
/// tried once before the first error is reported.
pub fn parse(contents: &str, path: &Path) -> Result<FrontMatter> {
    if contents.is_empty() {
        return Ok(FrontMatter::Absent);
    }
    let dashed = match parse_with(contents, path, DELIMITER) {
        Some(Ok(file)) => return Ok(FrontMatter::Present(file)),
        other => other,
    };
    let tilde = match parse_with(contents, path, FALLBACK_DELIMITER) {
        Some(Ok(file)) => {
            log::debug!("Read {} with '{FALLBACK_DELIMITER}' delimiters", path.display());
            return Ok(FrontMatter::Present(file));
        }
        other => other,
    };
    match (dashed, tilde) {
        (Some(Err(err)), _) | (None, Some(Err(err))) => Err(err),
        _ => Ok(FrontMatter::Absent),
    }
}

/// Decodes UTF-8, falling back to Latin-1 for undecodable input.
pub fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(err) => {
            log::debug!("Input is not UTF-8 ({err}), decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

pub fn read_file(effects: &dyn Effects, path: &Path) -> Result<FrontMatter> {
    let bytes = effects.read_bytes(path)?;
    parse(&decode(&bytes), path)
}
