use super::filters::*;
use super::keys;
use crate::{
    error::{Error, Result},
    model::Model,
    renderer::interface::TemplateRenderer,
};
use minijinja::{value::ValueKind, AutoEscape, Environment};
use serde_json::{json, Map, Value};

/// MiniJinja-based template rendering engine.
///
/// Output is never HTML-escaped: templates produce source code and
/// configuration files, not markup.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
    /// Default context that will be merged under the model
    default_context: Map<String, Value>,
}

impl MiniJinjaRenderer {
    /// Creates a new MiniJinjaRenderer instance with default environment.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        let mut default_context = Map::new();
        default_context.insert(
            "platform".to_string(),
            json!({
                "os": std::env::consts::OS,
                "family": std::env::consts::FAMILY,
                "arch": std::env::consts::ARCH,
            }),
        );

        env.add_filter("camel_case", to_camel_case);
        env.add_filter("kebab_case", to_kebab_case);
        env.add_filter("pascal_case", to_pascal_case);
        env.add_filter("screaming_snake_case", to_screaming_snake_case);
        env.add_filter("snake_case", to_snake_case);
        env.add_filter("table_case", to_table_case);
        env.add_filter("train_case", to_train_case);
        env.add_filter("plural", to_plural);
        env.add_filter("singular", to_singular);
        env.add_filter("foreign_key", to_foreign_key);
        env.add_filter("capitalize_first", capitalize_first);
        env.add_filter("uncapitalize_first", uncapitalize_first);
        env.add_filter("regex", regex_filter);
        env.add_function("capitalize_first", capitalize_first);
        env.add_function("uncapitalize_first", uncapitalize_first);

        Self { env, default_context }
    }

    /// Platform defaults, then every model entry at the root, then the whole
    /// model under `model` for `model['some-key']` lookups.
    fn context(&self, model: &Model) -> Value {
        let mut context = self.default_context.clone();
        for (key, value) in model.iter() {
            context.insert(key.clone(), value.clone());
        }
        context.insert("model".to_string(), model.to_value());
        Value::Object(context)
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(
        &self,
        template: &str,
        model: &Model,
        template_name: Option<&str>,
    ) -> Result<String> {
        if template.is_empty() {
            return Ok(String::new());
        }
        let template = keys::rewrite_template(template, &|key| model.contains_key(key));
        let name = template_name.unwrap_or("template");
        Ok(self.env.render_named_str(name, &template, self.context(model))?)
    }

    fn execute_expression(&self, expr_str: &str, model: &Model) -> Result<bool> {
        let rewritten = keys::rewrite_expression(expr_str, &|key| model.contains_key(key));
        let expr = self.env.compile_expression(&rewritten).map_err(|e| Error::Condition {
            expression: expr_str.to_string(),
            reason: format!("could not be parsed: {e}"),
        })?;
        let value = expr.eval(self.context(model)).map_err(|e| Error::Condition {
            expression: expr_str.to_string(),
            reason: format!("could not be evaluated: {e}"),
        })?;

        match value.kind() {
            ValueKind::Bool => Ok(value.is_true()),
            ValueKind::Undefined | ValueKind::None => Err(Error::Condition {
                expression: expr_str.to_string(),
                reason: "evaluated to null".to_string(),
            }),
            other => Err(Error::Condition {
                expression: expr_str.to_string(),
                reason: format!("evaluated to {other} '{value}' instead of a boolean"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::model::Model;
    use crate::renderer::{interface::TemplateRenderer, MiniJinjaRenderer};
    use serde_json::json;

    fn test_template(template: &str, expected: &str) {
        let renderer = MiniJinjaRenderer::new();
        let result = renderer.render(template, &Model::new(), None).unwrap();
        assert_eq!(result, expected);
    }

    fn model() -> Model {
        let mut model = Model::new();
        model.set("name", json!("World"));
        model.set("artifact-id", json!("demo"));
        model.set("root-package-dir", json!("com/example/demo"));
        model.set("pom", json!({ "version": "1.0" }));
        model
    }

    #[test]
    fn test_string_conversion_filters() {
        test_template("{{ 'hello world' | camel_case }}", "helloWorld");
        test_template("{{ 'hello world' | kebab_case }}", "hello-world");
        test_template("{{ 'hello world' | pascal_case }}", "HelloWorld");
        test_template("{{ 'hello world' | screaming_snake_case }}", "HELLO_WORLD");
        test_template("{{ 'hello world' | snake_case }}", "hello_world");
        test_template("{{ 'Hello World' | table_case }}", "hello_worlds");
        test_template("{{ 'hello world' | train_case }}", "Hello-World");
        test_template("{{ 'car' | plural }}", "cars");
        test_template("{{ 'cars' | singular }}", "car");
        test_template("{{ 'OrderItem' | foreign_key }}", "order_item_id");
        test_template("{{ 'owner' | capitalize_first }}", "Owner");
        test_template("{{ uncapitalize_first('Owner') }}", "owner");
    }

    #[test]
    fn test_regex_filter() {
        test_template("{{ 'hello world' | regex('^hello') }}", "true");
        test_template("{{ 'Hello World' | regex('hello') }}", "false");
        test_template("{{ 'hello' | regex('[') }}", "false");
    }

    #[test]
    fn empty_template_renders_empty() {
        test_template("", "");
    }

    #[test]
    fn renders_kebab_keys_and_model_lookups() {
        let renderer = MiniJinjaRenderer::new();
        let rendered = renderer
            .render(
                "{{ root-package-dir }}/{{ model['artifact-id'] }}/Hello {{ name }}",
                &model(),
                None,
            )
            .unwrap();
        assert_eq!(rendered, "com/example/demo/demo/Hello World");
    }

    #[test]
    fn output_is_not_escaped_and_trailing_newline_is_kept() {
        let renderer = MiniJinjaRenderer::new();
        let mut model = Model::new();
        model.set("generic", json!("List<String>"));
        let rendered = renderer.render("{{ generic }}\n", &model, None).unwrap();
        assert_eq!(rendered, "List<String>\n");
    }

    #[test]
    fn expressions_read_root_fields_and_nested_values() {
        let renderer = MiniJinjaRenderer::new();
        let model = model();
        assert!(renderer.execute_expression("artifact-id == 'demo'", &model).unwrap());
        assert!(renderer.execute_expression("pom.version != '2.0'", &model).unwrap());
        assert!(!renderer
            .execute_expression("model['artifact-id'] == 'other'", &model)
            .unwrap());
    }

    #[test]
    fn non_boolean_expression_is_an_error() {
        let renderer = MiniJinjaRenderer::new();
        let model = model();
        assert!(matches!(
            renderer.execute_expression("name", &model),
            Err(Error::Condition { .. })
        ));
        assert!(matches!(
            renderer.execute_expression("missing", &model),
            Err(Error::Condition { .. })
        ));
    }
}
