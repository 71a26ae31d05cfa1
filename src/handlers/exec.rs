use super::HandlerContext;
use crate::action::{ActionResult, Exec};
use crate::constants::EXEC_OUTPUT_VARIABLE;
use crate::effects::{ProcessOutput, ProcessSpec};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::model::Model;
use serde_json::Value;
use serde_json_path::JsonPath;
use std::path::Path;
use std::time::Duration;

/// A finished command and the value it produced for the model.
#[derive(Debug, Clone)]
pub struct Captured {
    pub command: String,
    pub output: ProcessOutput,
    /// Stdout with trailing newlines removed, or the JSON path extraction.
    /// `None` when stdout was redirected to a file.
    pub value: Option<Value>,
}

/// Applies `expression` to `document`. One matching node yields the node
/// itself, several yield an array of them and none is an error.
pub fn extract_json_path(expression: &str, document: &Value) -> Result<Value> {
    let path = JsonPath::parse(expression).map_err(|e| Error::JsonPath {
        expression: expression.to_string(),
        reason: format!("is invalid: {e}"),
    })?;
    let mut nodes = path.query(document).all();
    match nodes.len() {
        0 => Err(Error::JsonPath {
            expression: expression.to_string(),
            reason: "matched nothing".to_string(),
        }),
        1 => Ok(nodes.remove(0).clone()),
        _ => Ok(Value::Array(nodes.into_iter().cloned().collect())),
    }
}

fn command_line(ctx: &HandlerContext<'_>, model: &Model, exec: &Exec) -> Result<String> {
    let template = match (&exec.command, &exec.command_file) {
        (Some(command), _) => command.clone(),
        (None, Some(file)) => {
            let path = Path::new(file.trim()).resolve_from(ctx.command_dir);
            let contents = ctx.effects.read_text(&path)?;
            contents.lines().next().unwrap_or_default().to_string()
        }
        (None, None) => {
            return Err(Error::InvalidAction {
                path: ctx.action_dir.display().to_string(),
                reason: "'exec' needs a 'command' or a 'command-file'".to_string(),
            })
        }
    };
    let command = ctx.render(&template, model)?.trim().to_string();
    if command.is_empty() {
        return Err(Error::InvalidAction {
            path: ctx.action_dir.display().to_string(),
            reason: "'exec' command rendered to an empty string".to_string(),
        });
    }
    Ok(command)
}

/// Runs the command described by `exec` and extracts its value. A non-zero
/// exit is an error.
pub fn capture(
    ctx: &HandlerContext<'_>,
    model: &Model,
    exec: &Exec,
    stdin: Option<&str>,
) -> Result<Captured> {
    let command = command_line(ctx, model, exec)?;
    let optional_path = |template: &Option<String>| {
        template.as_deref().map(|t| ctx.render_path(t, model)).transpose()
    };
    let spec = ProcessSpec {
        command: command.clone(),
        dir: optional_path(&exec.dir)?.unwrap_or_else(|| ctx.root.to_path_buf()),
        stdin: stdin.map(str::to_string),
        stdout_to: optional_path(&exec.to)?,
        stderr_to: optional_path(&exec.errto)?,
        timeout: Some(exec.timeout.map(Duration::from_secs).unwrap_or(ctx.exec_timeout)),
    };

    log::info!("Executing: {command}");
    log::debug!("Working directory: {}", spec.dir.display());
    let output = ctx.effects.run(&spec)?;
    if !output.status.success() {
        if !output.stderr.is_empty() {
            log::error!("{}", output.stderr.trim_end());
        }
        return Err(Error::ExecFailed { command, status: output.status });
    }

    let value = match (exec.json_path(), &spec.stdout_to) {
        (Some(expression), Some(_)) => {
            return Err(Error::JsonPath {
                expression: expression.to_string(),
                reason: "cannot be applied to redirected output".to_string(),
            })
        }
        (Some(expression), None) => {
            let document: Value = serde_json::from_str(&output.stdout).map_err(|e| {
                Error::JsonPath {
                    expression: expression.to_string(),
                    reason: format!("cannot be applied, output is not JSON: {e}"),
                }
            })?;
            Some(extract_json_path(expression, &document)?)
        }
        (None, Some(_)) => None,
        (None, None) => {
            Some(Value::String(output.stdout.trim_end_matches(['\r', '\n']).to_string()))
        }
    };

    Ok(Captured { command, output, value })
}

/// Runs the command and binds its value into the model under
/// `define.name`, or [`EXEC_OUTPUT_VARIABLE`] when no name is given.
pub fn execute(
    ctx: &HandlerContext<'_>,
    model: &mut Model,
    exec: &Exec,
    body: Option<&str>,
) -> Result<ActionResult> {
    let stdin = if exec.stdin { body } else { None };
    let captured = match capture(ctx, model, exec, stdin) {
        Ok(captured) => captured,
        Err(err) if exec.continue_on_error => {
            log::warn!("Command failed but continue-on-error is set: {err}");
            return Ok(ActionResult::tolerated_failure().with_output("error", err.to_string()));
        }
        Err(err) => return Err(err),
    };

    let mut result = ActionResult::success()
        .with_output("stdout", captured.output.stdout)
        .with_output("stderr", captured.output.stderr);
    if let Some(value) = captured.value {
        let name = exec.variable_name().unwrap_or(EXEC_OUTPUT_VARIABLE);
        log::debug!("Binding command output to '{name}'");
        model.set(name, value.clone());
        result = result.with_output(name, value);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionStatus, Define};
    use crate::effects::MemoryEffects;
    use crate::handlers::tests::context;
    use crate::renderer::MiniJinjaRenderer;
    use serde_json::json;
    use std::path::PathBuf;

    fn exec(command: &str) -> Exec {
        Exec { command: Some(command.to_string()), ..Default::default() }
    }

    #[test]
    fn binds_json_path_extraction_as_number() {
        let effects = MemoryEffects::new().with_output(0, "{\"value\": 42}\n", "");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);
        let mut model = Model::new();
        let action = Exec {
            define: Some(Define {
                name: Some("answer".to_string()),
                json_path: Some("$.value".to_string()),
            }),
            ..exec("print-json")
        };

        let result = execute(&ctx, &mut model, &action, None).unwrap();

        assert_eq!(result.outcome, ActionStatus::Success);
        assert_eq!(model.get("answer"), Some(&json!(42)));
    }

    #[test]
    fn plain_output_goes_to_default_variable() {
        let effects = MemoryEffects::new().with_output(0, "hello\n", "");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);
        let mut model = Model::new();

        execute(&ctx, &mut model, &exec("echo hello"), None).unwrap();

        assert_eq!(model.get(EXEC_OUTPUT_VARIABLE), Some(&json!("hello")));
    }

    #[test]
    fn renders_command_and_resolves_paths_from_root() {
        let effects = MemoryEffects::new().with_output(0, "ok", "");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);
        let mut model = Model::new();
        model.set("artifact-id", json!("demo"));
        let action = Exec {
            dir: Some("target".to_string()),
            to: Some("out/{{artifact-id}}.log".to_string()),
            timeout: Some(7),
            ..exec("echo {{artifact-id}}")
        };

        execute(&ctx, &mut model, &action, None).unwrap();

        let runs = effects.runs();
        assert_eq!(runs[0].command, "echo demo");
        assert_eq!(runs[0].dir, PathBuf::from("/project/target"));
        assert_eq!(runs[0].stdout_to, Some(PathBuf::from("/project/out/demo.log")));
        assert_eq!(runs[0].timeout, Some(Duration::from_secs(7)));
        assert_eq!(effects.file("/project/out/demo.log").unwrap(), "ok");
        assert!(!model.contains_key(EXEC_OUTPUT_VARIABLE));
    }

    #[test]
    fn pipes_body_when_requested() {
        let effects = MemoryEffects::new().with_output(0, "", "");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);
        let action = Exec { stdin: true, ..exec("cat") };

        execute(&ctx, &mut Model::new(), &action, Some("input text")).unwrap();

        assert_eq!(effects.runs()[0].stdin.as_deref(), Some("input text"));
    }

    #[test]
    fn command_file_first_line_is_used() {
        let effects = MemoryEffects::new()
            .with_file("/project/.spring/commands/demo/new/cmd.txt", "echo from file\nignored\n")
            .with_output(0, "", "");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);
        let action = Exec { command_file: Some("cmd.txt".to_string()), ..Default::default() };

        execute(&ctx, &mut Model::new(), &action, None).unwrap();

        assert_eq!(effects.runs()[0].command, "echo from file");
    }

    #[test]
    fn non_zero_exit_is_fatal() {
        let effects = MemoryEffects::new().with_output(3, "", "boom");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);

        let err = execute(&ctx, &mut Model::new(), &exec("false"), None).unwrap_err();

        assert!(matches!(err, Error::ExecFailed { .. }));
        assert!(err.to_string().contains("exit code 3"));
    }

    #[test]
    fn continue_on_error_records_failure() {
        let effects = MemoryEffects::new().with_output(1, "", "boom");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);
        let action = Exec { continue_on_error: true, ..exec("false") };

        let result = execute(&ctx, &mut Model::new(), &action, None).unwrap();

        assert_eq!(result.outcome, ActionStatus::Failure);
        assert_eq!(result.conclusion, ActionStatus::Success);
    }

    #[test]
    fn json_path_errors_are_not_ignored() {
        let effects = MemoryEffects::new()
            .with_output(0, "not json", "")
            .with_output(0, "{\"a\": 1}", "");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);
        let action = Exec { json_path: Some("$.b".to_string()), ..exec("x") };

        let not_json = execute(&ctx, &mut Model::new(), &action, None).unwrap_err();
        let no_match = execute(&ctx, &mut Model::new(), &action, None).unwrap_err();

        assert!(matches!(not_json, Error::JsonPath { .. }));
        assert!(matches!(no_match, Error::JsonPath { .. }));
    }

    #[test]
    fn extraction_of_several_nodes_is_an_array() {
        let document = json!({"items": [{"id": "a"}, {"id": "b"}]});
        assert_eq!(extract_json_path("$.items[*].id", &document).unwrap(), json!(["a", "b"]));
        assert_eq!(extract_json_path("$.items[0].id", &document).unwrap(), json!("a"));
        assert!(extract_json_path("$[", &document).is_err());
    }
}
