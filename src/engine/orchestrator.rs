use super::report::{ActionReport, ExecutionReport, FileOutcome, FileReport};
use super::Stage;
use crate::action::{Action, ActionEntry, ActionResult, MavenTarget};
use crate::command::{commands_dir, resolve, seed_options, Command};
use crate::condition;
use crate::constants::DEFAULT_EXEC_TIMEOUT_SECS;
use crate::effects::Effects;
use crate::error::{Error, Result};
use crate::frontmatter::{read_file, ActionFile, FrontMatter};
use crate::handlers::{
    exec, generate, inject, maven, vars, HandlerContext, MavenRecipes, UnsupportedMavenRecipes,
};
use crate::model::{default_populators, populate, Model, ModelPopulator};
use crate::prompt::QuestionPrompter;
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const UNKNOWN_ACTION: &str = "unknown action";

fn failed(path: &Path, stage: Stage, action: &str, source: Error) -> Error {
    Error::ActionFailed {
        path: path.to_path_buf(),
        stage,
        action: action.to_string(),
        source: Box::new(source),
    }
}

/// Executes commands against one project root.
pub struct Orchestrator<'a> {
    root: PathBuf,
    renderer: &'a dyn TemplateRenderer,
    effects: &'a dyn Effects,
    prompter: &'a dyn QuestionPrompter,
    maven: &'a dyn MavenRecipes,
    populators: Vec<Box<dyn ModelPopulator + 'a>>,
    exec_timeout: Duration,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        renderer: &'a dyn TemplateRenderer,
        effects: &'a dyn Effects,
        prompter: &'a dyn QuestionPrompter,
    ) -> Self {
        Self {
            root: root.into(),
            renderer,
            effects,
            prompter,
            maven: &UnsupportedMavenRecipes,
            populators: default_populators(effects),
            exec_timeout: Duration::from_secs(DEFAULT_EXEC_TIMEOUT_SECS),
        }
    }

    /// Replaces the populators; they run in the given order.
    pub fn with_populators(mut self, populators: Vec<Box<dyn ModelPopulator + 'a>>) -> Self {
        self.populators = populators;
        self
    }

    pub fn with_maven(mut self, maven: &'a dyn MavenRecipes) -> Self {
        self.maven = maven;
        self
    }

    /// Timeout for exec actions that declare none.
    pub fn with_exec_timeout(mut self, timeout: Duration) -> Self {
        self.exec_timeout = timeout;
        self
    }

    /// Runs `<noun> <verb>` with user-supplied option values.
    pub fn execute(
        &self,
        noun: &str,
        verb: &str,
        supplied: &IndexMap<String, String>,
    ) -> Result<ExecutionReport> {
        let resolved = resolve(&self.root, noun, verb).map_err(|e| match e {
            Error::CommandNotFound { .. } => e,
            other => failed(&commands_dir(&self.root), Stage::Scanning, UNKNOWN_ACTION, other),
        })?;

        let model = self.build_model(&resolved.dir, &resolved.command, supplied)?;
        self.run_files(&resolved.dir, &resolved.action_files, model)
    }

    /// Seeds the command's options, then runs the populators. Supplied
    /// values are seeded first so populators cannot shadow them.
    pub fn build_model(
        &self,
        command_dir: &Path,
        command: &Command,
        supplied: &IndexMap<String, String>,
    ) -> Result<Model> {
        let mut model = Model::new();
        seed_options(command, supplied, &mut model)?;
        populate(&self.root, &self.populators, &mut model)
            .map_err(|e| failed(command_dir, Stage::ModelBuilding, UNKNOWN_ACTION, e))?;
        Ok(model)
    }

    /// Runs action files in order over `model`. Any fatal error stops the
    /// run; effects of files already executed stay in place.
    pub fn run_files(
        &self,
        command_dir: &Path,
        files: &[PathBuf],
        mut model: Model,
    ) -> Result<ExecutionReport> {
        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            let outcome = match read_file(self.effects, path)
                .map_err(|e| failed(path, Stage::Parsing, UNKNOWN_ACTION, e))?
            {
                FrontMatter::Absent => {
                    log::debug!("No front matter in {}, skipping", path.display());
                    FileOutcome::NoFrontMatter
                }
                FrontMatter::Present(file) => self.run_file(command_dir, &file, &mut model)?,
            };
            reports.push(FileReport { path: path.clone(), outcome });
        }

        if reports.iter().all(|r| r.outcome == FileOutcome::NoFrontMatter) {
            return Err(Error::NoActionFiles { dir: command_dir.display().to_string() });
        }
        let report = ExecutionReport { files: reports, model };
        log::debug!(
            "Ran {} action(s) from {} file(s)",
            report.actions().count(),
            report.files.len()
        );
        Ok(report)
    }

    fn run_file(
        &self,
        command_dir: &Path,
        file: &ActionFile,
        model: &mut Model,
    ) -> Result<FileOutcome> {
        let path = file.path.as_path();
        if let Some(conditional) = &file.header.conditional {
            let holds = conditional
                .evaluate(self.renderer, model)
                .map_err(|e| failed(path, Stage::Guarding, UNKNOWN_ACTION, e))?;
            if !holds {
                log::info!("Skipping {}, its condition does not hold", path.display());
                return Ok(FileOutcome::GuardedOut);
            }
        }

        let ctx = HandlerContext {
            root: &self.root,
            command_dir,
            action_dir: path.parent().unwrap_or(command_dir),
            renderer: self.renderer,
            effects: self.effects,
            prompter: self.prompter,
            maven: self.maven,
            exec_timeout: self.exec_timeout,
        };

        let mut actions = Vec::with_capacity(file.header.actions.len());
        for entry in &file.header.actions {
            let kind = entry.action.kind();
            let result = self.run_entry(&ctx, file, entry, model)?;
            log::debug!("{kind} in {} concluded {}", path.display(), result.conclusion);
            actions.push(ActionReport { kind, result });
        }
        Ok(FileOutcome::Executed(actions))
    }

    fn run_entry(
        &self,
        ctx: &HandlerContext<'_>,
        file: &ActionFile,
        entry: &ActionEntry,
        model: &mut Model,
    ) -> Result<ActionResult> {
        let path = file.path.as_path();
        let kind = entry.action.kind();

        if let Some(guard) = &entry.guard {
            let holds = condition::evaluate(self.renderer, guard, model)
                .map_err(|e| failed(path, Stage::Guarding, kind, e))?;
            if !holds {
                log::info!("Skipping {kind} in {}, its condition does not hold", path.display());
                return Ok(ActionResult::skipped());
            }
        }

        let body = if entry.action.uses_body() {
            let name = path.file_name().and_then(|n| n.to_str());
            self.renderer
                .render(&file.text, model, name)
                .map_err(|e| failed(path, Stage::Rendering, kind, e))?
        } else {
            String::new()
        };

        dispatch(ctx, &entry.action, &body, model)
            .map_err(|e| failed(path, Stage::Dispatching, kind, e))
    }
}

fn dispatch(
    ctx: &HandlerContext<'_>,
    action: &Action,
    body: &str,
    model: &mut Model,
) -> Result<ActionResult> {
    match action {
        Action::Generate(generate) => generate::execute(ctx, model, generate, body),
        Action::Inject(inject) => inject::execute(ctx, model, inject, body),
        Action::Exec(exec) => exec::execute(ctx, model, exec, Some(body)),
        Action::Vars(vars) => vars::execute(ctx, model, vars),
        Action::InjectDependency(snippet) => {
            maven::execute(ctx, model, MavenTarget::Dependency, snippet, body)
        }
        Action::InjectDependencyManagement(snippet) => {
            maven::execute(ctx, model, MavenTarget::DependencyManagement, snippet, body)
        }
        Action::InjectRepository(snippet) => {
            maven::execute(ctx, model, MavenTarget::Repository, snippet, body)
        }
        Action::InjectBuildPlugin(snippet) => {
            maven::execute(ctx, model, MavenTarget::BuildPlugin, snippet, body)
        }
    }
}
