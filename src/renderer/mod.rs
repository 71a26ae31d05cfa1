//! Template rendering and expression evaluation over the command model.
//!
//! - `interface`: the [`TemplateRenderer`] seam used by handlers and guards
//! - `minijinja`: the MiniJinja-backed implementation
//! - `filters`: helper filters registered on every environment
//! - `keys`: rewriting of kebab-case model keys into addressable lookups

pub mod filters;
pub mod interface;
pub mod keys;
pub mod minijinja;

pub use self::minijinja::MiniJinjaRenderer;
pub use interface::TemplateRenderer;

/// Returns the renderer used for every action file, whatever engine it names.
pub fn get_template_engine() -> MiniJinjaRenderer {
    MiniJinjaRenderer::new()
}
