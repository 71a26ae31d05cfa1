use super::HandlerContext;
use crate::action::{ActionResult, Inject};
use crate::error::{Error, Result};
use crate::model::Model;

/// Result of splicing text into a file's lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Splice {
    pub text: String,
    /// Markers that were declared but not found.
    pub missing: Vec<String>,
    pub inserted: usize,
}

/// Inserts `insert` before the first line containing `before`, then after
/// the first line containing `after` in the already modified lines. Line
/// endings and the presence of a final newline follow `original`.
pub fn splice(original: &str, insert: &str, before: Option<&str>, after: Option<&str>) -> Splice {
    let newline = if original.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing_newline = original.ends_with('\n');
    let mut lines: Vec<&str> = original.lines().collect();
    let insert_lines: Vec<&str> = insert.lines().collect();
    let mut missing = Vec::new();
    let mut inserted = 0;

    if let Some(marker) = before {
        match lines.iter().position(|line| line.contains(marker)) {
            Some(index) => {
                lines.splice(index..index, insert_lines.iter().copied());
                inserted += 1;
            }
            None => missing.push(marker.to_string()),
        }
    }
    if let Some(marker) = after {
        match lines.iter().position(|line| line.contains(marker)) {
            Some(index) => {
                lines.splice(index + 1..index + 1, insert_lines.iter().copied());
                inserted += 1;
            }
            None => missing.push(marker.to_string()),
        }
    }

    let mut text = lines.join(newline);
    if trailing_newline {
        text.push_str(newline);
    }
    Splice { text, missing, inserted }
}

/// Splices the rendered body into an existing file next to its markers.
/// Files already containing the `skip` marker are left untouched.
pub fn execute(
    ctx: &HandlerContext<'_>,
    model: &Model,
    inject: &Inject,
    body: &str,
) -> Result<ActionResult> {
    let destination = ctx.render_path(&inject.to, model)?;
    if ctx.effects.is_dir(&destination) {
        return Err(Error::Inject { path: destination, reason: "it is a directory".to_string() });
    }
    if !ctx.effects.exists(&destination) {
        return Err(Error::Inject { path: destination, reason: "file does not exist".to_string() });
    }

    let contents = ctx.effects.read_text(&destination)?;
    if let Some(skip) = &inject.skip {
        let skip = ctx.render(skip, model)?;
        if !skip.is_empty() && contents.contains(&skip) {
            log::info!(
                "Skipping injection into {}. Found skip marker '{skip}'.",
                destination.display()
            );
            return Ok(ActionResult::skipped());
        }
    }

    let text = match &inject.text {
        Some(text) => ctx.render(text, model)?,
        None => body.to_string(),
    };
    let before = inject.before.as_deref().map(|m| ctx.render(m, model)).transpose()?;
    let after = inject.after.as_deref().map(|m| ctx.render(m, model)).transpose()?;

    let spliced = splice(&contents, &text, before.as_deref(), after.as_deref());
    for marker in &spliced.missing {
        log::warn!(
            "Marker '{marker}' not found in {}, nothing inserted for it",
            destination.display()
        );
    }
    let mut result = if spliced.inserted == 0 {
        ActionResult::skipped()
    } else {
        ctx.effects.replace_text(&destination, &spliced.text)?;
        log::info!("Injected into {}", destination.display());
        ActionResult::success()
    };
    if !spliced.missing.is_empty() {
        result = result.with_output("missing-markers", spliced.missing);
    }
    Ok(result)
}
