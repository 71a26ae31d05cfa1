//! One handler per action kind. Handlers render their inputs against the
//! model and perform their side effect through [`Effects`].

pub mod exec;
pub mod generate;
pub mod inject;
pub mod maven;
pub mod vars;

pub use maven::{MavenRecipes, UnsupportedMavenRecipes};

use crate::effects::Effects;
use crate::error::Result;
use crate::ext::PathExt;
use crate::model::Model;
use crate::prompt::QuestionPrompter;
use crate::renderer::TemplateRenderer;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything a handler needs besides the model and the action itself.
pub struct HandlerContext<'a> {
    /// Project root; destinations and working directories resolve from here.
    pub root: &'a Path,
    /// Directory of the command verb; `command-file` resolves from here.
    pub command_dir: &'a Path,
    /// Directory of the action file being executed; `from` resolves from here.
    pub action_dir: &'a Path,
    pub renderer: &'a dyn TemplateRenderer,
    pub effects: &'a dyn Effects,
    pub prompter: &'a dyn QuestionPrompter,
    pub maven: &'a dyn MavenRecipes,
    pub exec_timeout: Duration,
}

impl HandlerContext<'_> {
    pub(crate) fn render(&self, template: &str, model: &Model) -> Result<String> {
        self.renderer.render(template, model, None)
    }

    /// Renders a path expression and resolves it against the project root.
    pub(crate) fn render_path(&self, template: &str, model: &Model) -> Result<PathBuf> {
        let rendered = self.render(template, model)?;
        Ok(Path::new(rendered.trim()).resolve_from(self.root))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::action::Question;

    pub(crate) const ROOT: &str = "/project";
    pub(crate) const COMMAND_DIR: &str = "/project/.spring/commands/demo/new";

    /// Leaves every question unanswered.
    pub(crate) struct NoAnswers;

    impl QuestionPrompter for NoAnswers {
        fn ask(&self, _question: &Question, _choices: &[String]) -> Result<Option<String>> {
            Ok(None)
        }
    }

    pub(crate) fn context<'a>(
        effects: &'a dyn Effects,
        renderer: &'a dyn TemplateRenderer,
    ) -> HandlerContext<'a> {
        context_with(effects, renderer, &NoAnswers)
    }

    pub(crate) fn context_with<'a>(
        effects: &'a dyn Effects,
        renderer: &'a dyn TemplateRenderer,
        prompter: &'a dyn QuestionPrompter,
    ) -> HandlerContext<'a> {
        HandlerContext {
            root: Path::new(ROOT),
            command_dir: Path::new(COMMAND_DIR),
            action_dir: Path::new(COMMAND_DIR),
            renderer,
            effects,
            prompter,
            maven: &UnsupportedMavenRecipes,
            exec_timeout: Duration::from_secs(5),
        }
    }
}
