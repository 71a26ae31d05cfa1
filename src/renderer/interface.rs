use crate::error::Result;
use crate::model::Model;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string against the model.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `model` - Model values available to the template
    /// * `template_name` - Optional name for the template (used in error messages)
    ///
    /// # Returns
    /// * `Result<String>` - Rendered text, empty for an empty template
    fn render(
        &self,
        template: &str,
        model: &Model,
        template_name: Option<&str>,
    ) -> Result<String>;

    /// Evaluates a boolean expression against the model.
    ///
    /// Model entries are visible as root-level names and through the `model`
    /// mapping. An expression yielding anything other than a boolean, including
    /// an undefined or null value, is an error rather than `false`.
    ///
    /// # Arguments
    /// * `expr` - Expression to evaluate
    /// * `model` - Model values available to the expression
    ///
    /// # Returns
    /// * `Result<bool>` - The boolean result
    fn execute_expression(&self, expr: &str, model: &Model) -> Result<bool>;
}
