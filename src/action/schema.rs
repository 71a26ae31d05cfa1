use crate::condition::Conditional;
use crate::constants::{DEFAULT_ENGINE, KNOWN_ENGINES};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Render `text` (or the template at `from`, or the file body) into `to`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Generate {
    pub to: String,
    #[serde(default)]
    pub text: Option<String>,
    /// Template file, relative to the directory of the action file.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub overwrite: bool,
}

/// Splice the rendered body into an existing file around marker lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Inject {
    pub to: String,
    #[serde(default)]
    pub skip: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Binds command output to a model variable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Define {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "jsonPath")]
    pub json_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Exec {
    #[serde(default)]
    pub command: Option<String>,
    /// File whose first line is the command, relative to the verb directory.
    #[serde(default)]
    pub command_file: Option<String>,
    /// Redirects stdout into this file.
    #[serde(default)]
    pub to: Option<String>,
    /// Redirects stderr into this file.
    #[serde(default, alias = "error-to")]
    pub errto: Option<String>,
    /// Working directory, relative to the project root.
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub json_path: Option<String>,
    #[serde(default)]
    pub define: Option<Define>,
    /// Pipe the rendered body to the process's stdin.
    #[serde(default, rename = "in")]
    pub stdin: bool,
    /// Seconds before the process is killed.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Exec {
    /// JSON path applied to stdout, from `define` or the action itself.
    pub fn json_path(&self) -> Option<&str> {
        self.define
            .as_ref()
            .and_then(|d| d.json_path.as_deref())
            .or(self.json_path.as_deref())
    }

    pub fn variable_name(&self) -> Option<&str> {
        self.define.as_ref().and_then(|d| d.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QuestionOptions {
    /// Command whose (JSON path filtered) output lists the choices.
    #[serde(default)]
    pub exec: Option<Exec>,
    #[serde(default)]
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Attributes {
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub mask_character: Option<String>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub confirmation: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Question {
    pub name: String,
    pub label: String,
    #[serde(default = "default_question_type", rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Option<QuestionOptions>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
}

fn default_question_type() -> String {
    "input".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Vars {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub data: IndexMap<String, Value>,
    /// Role file receiving the values; the default role when absent.
    #[serde(default)]
    pub role: Option<String>,
}

/// Payload of the Maven POM mutations: an XML snippet and/or inline fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MavenSnippet {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

/// Which section of the POM a Maven mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MavenTarget {
    Dependency,
    DependencyManagement,
    Repository,
    BuildPlugin,
}

impl fmt::Display for MavenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MavenTarget::Dependency => "dependency",
            MavenTarget::DependencyManagement => "dependency management",
            MavenTarget::Repository => "repository",
            MavenTarget::BuildPlugin => "build plugin",
        };
        f.write_str(name)
    }
}

/// One declared action. Exactly one variant per action mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Generate(Generate),
    Inject(Inject),
    Exec(Exec),
    Vars(Vars),
    InjectDependency(MavenSnippet),
    InjectDependencyManagement(MavenSnippet),
    InjectRepository(MavenSnippet),
    InjectBuildPlugin(MavenSnippet),
}

impl Action {
    /// The front-matter key this action was declared under.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Generate(_) => "generate",
            Action::Inject(_) => "inject",
            Action::Exec(_) => "exec",
            Action::Vars(_) => "vars",
            Action::InjectDependency(_) => "inject-maven-dependency",
            Action::InjectDependencyManagement(_) => "inject-maven-dependency-management",
            Action::InjectRepository(_) => "inject-maven-repository",
            Action::InjectBuildPlugin(_) => "inject-maven-build-plugin",
        }
    }

    /// Whether the template body has to be rendered before dispatching.
    pub fn uses_body(&self) -> bool {
        match self {
            Action::Generate(generate) => generate.text.is_none() && generate.from.is_none(),
            Action::Inject(inject) => inject.text.is_none(),
            Action::Exec(exec) => exec.stdin,
            Action::Vars(_) => false,
            Action::InjectDependency(snippet)
            | Action::InjectDependencyManagement(snippet)
            | Action::InjectRepository(snippet)
            | Action::InjectBuildPlugin(snippet) => {
                snippet.text.is_none() && snippet.fields.is_empty()
            }
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Action::Generate(generate) if generate.to.trim().is_empty() => {
                Err("'generate.to' must not be empty".to_string())
            }
            Action::Inject(inject) if inject.before.is_none() && inject.after.is_none() => {
                Err("'inject' needs a 'before' or an 'after' marker".to_string())
            }
            Action::Exec(exec) => match (&exec.command, &exec.command_file) {
                (Some(_), Some(_)) => {
                    Err("'exec' declares both 'command' and 'command-file'".to_string())
                }
                (None, None) => Err("'exec' needs a 'command' or a 'command-file'".to_string()),
                _ => Ok(()),
            },
            Action::Vars(vars) if !vars.questions.is_empty() && !vars.data.is_empty() => {
                Err("'vars' declares both 'questions' and 'data'".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// One entry of an action file: the action and its own optional guard.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEntry {
    pub guard: Option<String>,
    pub action: Action,
}

/// Deserialized action file header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub engine: String,
    pub conditional: Option<Conditional>,
    pub actions: Vec<ActionEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct RawAction {
    #[serde(default, rename = "if")]
    guard: Option<String>,
    #[serde(default)]
    generate: Option<Generate>,
    #[serde(default)]
    inject: Option<Inject>,
    #[serde(default)]
    exec: Option<Exec>,
    #[serde(default)]
    vars: Option<Vars>,
    #[serde(default)]
    inject_maven_dependency: Option<MavenSnippet>,
    #[serde(default)]
    inject_maven_dependency_management: Option<MavenSnippet>,
    #[serde(default)]
    inject_maven_repository: Option<MavenSnippet>,
    #[serde(default, alias = "inject-maven-plugin")]
    inject_maven_build_plugin: Option<MavenSnippet>,
}

impl TryFrom<RawAction> for ActionEntry {
    type Error = String;

    fn try_from(raw: RawAction) -> std::result::Result<Self, Self::Error> {
        let declared = [
            raw.generate.map(Action::Generate),
            raw.inject.map(Action::Inject),
            raw.exec.map(Action::Exec),
            raw.vars.map(Action::Vars),
            raw.inject_maven_dependency.map(Action::InjectDependency),
            raw.inject_maven_dependency_management.map(Action::InjectDependencyManagement),
            raw.inject_maven_repository.map(Action::InjectRepository),
            raw.inject_maven_build_plugin.map(Action::InjectBuildPlugin),
        ];
        let mut actions = declared.into_iter().flatten();

        let action = actions.next().ok_or_else(|| {
            "no known action declared (expected one of generate, inject, exec, vars, \
             inject-maven-dependency, inject-maven-dependency-management, \
             inject-maven-repository, inject-maven-build-plugin)"
                .to_string()
        })?;
        if let Some(extra) = actions.next() {
            return Err(format!(
                "'{}' and '{}' are declared in the same action; use 'actions' for several",
                action.kind(),
                extra.kind()
            ));
        }
        action.validate()?;
        Ok(ActionEntry { guard: raw.guard.filter(|g| !g.trim().is_empty()), action })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct RawHeader {
    #[serde(default)]
    engine: Option<String>,
    #[serde(default)]
    action: Option<RawAction>,
    #[serde(default)]
    actions: Option<Vec<RawAction>>,
    #[serde(default)]
    conditional: Option<Conditional>,
}

impl RawHeader {
    /// Converts into a [`Header`]; `origin` names the file in errors.
    pub(crate) fn into_header(self, origin: &str) -> Result<Header> {
        let invalid = |reason: String| Error::InvalidAction { path: origin.to_string(), reason };

        let raw_actions = match (self.action, self.actions) {
            (Some(_), Some(_)) => {
                return Err(invalid("declare either 'action' or 'actions', not both".to_string()))
            }
            (Some(action), None) => vec![action],
            (None, Some(actions)) if !actions.is_empty() => actions,
            _ => return Err(invalid("no 'action' declared".to_string())),
        };
        let actions = raw_actions
            .into_iter()
            .map(ActionEntry::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let engine = self.engine.unwrap_or_else(|| DEFAULT_ENGINE.to_string());
        if !KNOWN_ENGINES.contains(&engine.as_str()) {
            log::warn!(
                "Unknown template engine '{engine}' in {origin}, rendering with {DEFAULT_ENGINE}"
            );
        }

        Ok(Header { engine, conditional: self.conditional, actions })
    }
}
