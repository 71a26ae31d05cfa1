use super::{exec, HandlerContext};
use crate::action::{ActionResult, Question, Vars};
use crate::error::{Error, Result};
use crate::model::{infer_value, Model};
use crate::role::{RoleStore, RoleVars};
use serde_json::Value;

const INPUT: &str = "input";
const DROPDOWN: &str = "dropdown";
const PATH: &str = "path";

/// Checks every question before anything is asked, so a bad declaration
/// never leaves a half-answered role behind.
fn validate(questions: &[Question]) -> Result<()> {
    for question in questions {
        match question.kind.as_str() {
            INPUT => {}
            DROPDOWN if question.attributes.as_ref().is_some_and(|a| a.multiple) => {
                return Err(Error::Unsupported(format!(
                    "multiple selection for question '{}'",
                    question.name
                )))
            }
            DROPDOWN => {}
            PATH => {
                return Err(Error::Unsupported(format!(
                    "question type 'path' for question '{}'",
                    question.name
                )))
            }
            other => {
                return Err(Error::InvalidAction {
                    path: question.name.clone(),
                    reason: format!(
                        "unknown question type '{other}', expected one of {INPUT}, {DROPDOWN}, {PATH}"
                    ),
                })
            }
        }
    }
    Ok(())
}

/// Items a dropdown offers: literal choices, or the output of its `exec`.
/// A list yields its items, a map its keys and a scalar a single item.
fn choices(ctx: &HandlerContext<'_>, model: &Model, question: &Question) -> Result<Vec<String>> {
    let Some(options) = &question.options else {
        return Ok(Vec::new());
    };
    if !options.choices.is_empty() {
        return options.choices.iter().map(|choice| ctx.render(choice, model)).collect();
    }
    let Some(exec) = &options.exec else {
        return Ok(Vec::new());
    };
    let captured = exec::capture(ctx, model, exec, None)?;
    let items = match captured.value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        Some(other) => vec![scalar_text(&other)],
    };
    Ok(items)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collects values from `data` or from the prompter, stores them in the
/// model and persists them into the role file.
pub fn execute(ctx: &HandlerContext<'_>, model: &mut Model, vars: &Vars) -> Result<ActionResult> {
    if !vars.questions.is_empty() && !vars.data.is_empty() {
        return Err(Error::InvalidAction {
            path: ctx.action_dir.display().to_string(),
            reason: "'vars' declares both 'questions' and 'data'".to_string(),
        });
    }
    validate(&vars.questions)?;

    let mut entries = RoleVars::new();
    for (key, value) in &vars.data {
        let key = ctx.render(key, model)?;
        let value = match value {
            Value::String(text) => infer_value(&ctx.render(text, model)?),
            other => other.clone(),
        };
        entries.insert(key, value);
    }

    for question in &vars.questions {
        let choices = choices(ctx, model, question)?;
        let question = Question { label: ctx.render(&question.label, model)?, ..question.clone() };
        if let Some(answer) = ctx.prompter.ask(&question, &choices)? {
            entries.insert(question.name.clone(), infer_value(&answer));
        }
    }

    if entries.is_empty() {
        log::info!("No variables collected");
        return Ok(ActionResult::skipped());
    }

    for (key, value) in &entries {
        model.set(key.clone(), value.clone());
    }
    let role = vars.role.as_deref().map(|r| ctx.render(r, model)).transpose()?;
    let path = RoleStore::new(ctx.root).update(ctx.effects, role.as_deref(), &entries)?;
    log::info!("Updated {} variable(s) in {}", entries.len(), path.display());

    Ok(ActionResult::success().with_output("role-file", path.display().to_string()))
}
