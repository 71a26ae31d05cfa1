use super::HandlerContext;
use crate::action::{ActionResult, Generate};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::model::Model;
use std::path::Path;

/// Renders the template into `to`. An existing destination is left alone
/// unless `overwrite` is set.
///
/// The template is `text` when given, else the file at `from`, else the
/// body of the action file.
pub fn execute(
    ctx: &HandlerContext<'_>,
    model: &Model,
    generate: &Generate,
    body: &str,
) -> Result<ActionResult> {
    let destination = ctx.render_path(&generate.to, model)?;
    if destination == ctx.root {
        return Err(Error::InvalidAction {
            path: generate.to.clone(),
            reason: "'generate.to' rendered to an empty path".to_string(),
        });
    }

    if ctx.effects.exists(&destination) && !generate.overwrite {
        log::info!(
            "Skipping generation of {}. File exists and overwrite option not specified.",
            destination.display()
        );
        return Ok(ActionResult::skipped().with_output("path", destination.display().to_string()));
    }

    let template = match (&generate.text, &generate.from) {
        (Some(text), _) => text.clone(),
        (None, Some(from)) => {
            let from = Path::new(from.trim()).resolve_from(ctx.action_dir);
            ctx.effects.read_text(&from)?
        }
        (None, None) => body.to_string(),
    };

    let name = destination.file_name().and_then(|n| n.to_str());
    let rendered = ctx.renderer.render(&template, model, name)?;

    if ctx.effects.is_dir(&destination) {
        return Err(Error::Generate {
            path: destination,
            source: Box::new(Error::Other(anyhow::anyhow!("destination is a directory"))),
        });
    }
    ctx.effects
        .write_text(&destination, &rendered)
        .map_err(|e| Error::Generate { path: destination.clone(), source: Box::new(e) })?;

    log::info!("Generated {}", destination.display());
    Ok(ActionResult::success().with_output("path", destination.display().to_string()))
}
