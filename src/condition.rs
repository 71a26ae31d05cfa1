//! Guards deciding whether an action file, or one of its actions, runs.

use crate::error::Result;
use crate::model::Model;
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static STRING_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#).expect("string pattern is valid")
});

static ROOT_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w\])\s]|\b(?:and|or|not)\b)\s*\[").expect("index pattern is valid")
});

static HASH_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z_])").expect("variable pattern is valid"));

/// `conditional:` block of an action file. Every declared condition must
/// hold: the `if` expression and each `<model-key>: <value>` pair.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Conditional {
    #[serde(default, rename = "if")]
    pub expression: Option<String>,
    #[serde(flatten)]
    pub matches: IndexMap<String, Value>,
}

impl Conditional {
    pub fn evaluate(&self, renderer: &dyn TemplateRenderer, model: &Model) -> Result<bool> {
        for (key, expected) in &self.matches {
            let holds = model.get(key).is_some_and(|actual| values_match(actual, expected));
            if !holds {
                log::debug!("Condition '{key}' does not match {expected}");
                return Ok(false);
            }
        }
        match self.expression.as_deref() {
            Some(expression) => evaluate(renderer, expression, model),
            None => Ok(true),
        }
    }
}

/// Equal values, or scalars with the same textual form (`8` matches `'8'`).
fn values_match(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::String(a), b) | (b, Value::String(a)) if !b.is_object() && !b.is_array() => {
            *a == b.to_string().trim_matches('"')
        }
        _ => false,
    }
}

/// Evaluates a guard expression. Blank expressions hold.
pub fn evaluate(renderer: &dyn TemplateRenderer, expression: &str, model: &Model) -> Result<bool> {
    let normalized = normalize_expression(expression);
    if normalized.is_empty() {
        return Ok(true);
    }
    let result = renderer.execute_expression(&normalized, model)?;
    log::debug!("Condition '{expression}' evaluated to {result}");
    Ok(result)
}

/// Accepts the `#{ … }` guard form: the wrapper is dropped, a root
/// `['key']` index reads from the model and `#name` reads variable `name`.
pub fn normalize_expression(expression: &str) -> String {
    let trimmed = expression.trim();
    let inner = trimmed
        .strip_prefix("#{")
        .and_then(|rest| rest.strip_suffix('}'))
        .map(str::trim)
        .unwrap_or(trimmed);

    // Patterns only look at code; string literals are blanked out.
    let mut masked = inner.to_string();
    for literal in STRING_LITERAL.find_iter(inner) {
        masked.replace_range(literal.range(), &"_".repeat(literal.len()));
    }
    let model_lookups: Vec<usize> = ROOT_INDEX.find_iter(&masked).map(|m| m.end() - 1).collect();
    let hashes: Vec<usize> = HASH_VARIABLE.find_iter(&masked).map(|m| m.start()).collect();

    let mut normalized = String::with_capacity(inner.len() + 5 * model_lookups.len());
    for (index, ch) in inner.char_indices() {
        if model_lookups.contains(&index) {
            normalized.push_str("model");
        }
        if !hashes.contains(&index) {
            normalized.push(ch);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::renderer::MiniJinjaRenderer;
    use serde_json::json;

    fn model() -> Model {
        let mut model = Model::new();
        model.set("artifact-id", json!("demo"));
        model.set("java-version", json!(17));
        model.set("features", json!(["web", "jpa"]));
        model
    }

    #[test]
    fn normalizes_wrapped_expressions() {
        assert_eq!(
            normalize_expression("#{ ['artifact-id'] == 'demo' }"),
            "model['artifact-id'] == 'demo'"
        );
        assert_eq!(normalize_expression("#flag and not #other"), "flag and not other");
        assert_eq!(normalize_expression("features[0] == '#1'"), "features[0] == '#1'");
        assert_eq!(
            normalize_expression("x == 'a' and ['k'] == 1"),
            "x == 'a' and model['k'] == 1"
        );
        assert_eq!(normalize_expression("  "), "");
    }

    #[test]
    fn evaluates_wrapped_expression_against_model() {
        let renderer = MiniJinjaRenderer::new();
        assert!(evaluate(&renderer, "#{ ['artifact-id'] == 'demo' }", &model()).unwrap());
        assert!(!evaluate(&renderer, "artifact-id != 'demo'", &model()).unwrap());
        assert!(evaluate(&renderer, "features[1] == 'jpa'", &model()).unwrap());
    }

    #[test]
    fn non_boolean_guard_is_an_error() {
        let renderer = MiniJinjaRenderer::new();
        assert!(matches!(
            evaluate(&renderer, "java-version", &model()),
            Err(Error::Condition { .. })
        ));
    }

    #[test]
    fn absent_conditional_holds() {
        let renderer = MiniJinjaRenderer::new();
        assert!(Conditional::default().evaluate(&renderer, &Model::new()).unwrap());
    }

    #[test]
    fn field_matches_must_all_hold() {
        let renderer = MiniJinjaRenderer::new();
        let conditional: Conditional =
            serde_yaml::from_str("artifact-id: demo\njava-version: '17'\n").unwrap();
        assert!(conditional.evaluate(&renderer, &model()).unwrap());

        let conditional: Conditional =
            serde_yaml::from_str("artifact-id: other\nif: \"java-version == 17\"\n").unwrap();
        assert!(!conditional.evaluate(&renderer, &model()).unwrap());
    }
}
