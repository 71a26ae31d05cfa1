use super::HandlerContext;
use crate::action::{ActionResult, MavenSnippet, MavenTarget};
use crate::error::{Error, Result};
use crate::model::Model;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

const POM: &str = "pom.xml";

/// A Maven snippet with every template already rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedSnippet {
    /// XML fragment describing the element to add.
    pub text: Option<String>,
    /// Inline coordinates such as `group-id` or `artifact-id`.
    pub fields: IndexMap<String, Value>,
}

/// Rewrites a POM. Implementations own the XML handling.
pub trait MavenRecipes {
    fn apply(&self, pom: &Path, target: MavenTarget, snippet: &RenderedSnippet) -> Result<()>;
}

/// Recipes used when no POM rewriting support is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedMavenRecipes;

impl MavenRecipes for UnsupportedMavenRecipes {
    fn apply(&self, pom: &Path, target: MavenTarget, _snippet: &RenderedSnippet) -> Result<()> {
        Err(Error::Unsupported(format!("injecting a Maven {target} into {}", pom.display())))
    }
}

fn render_value(ctx: &HandlerContext<'_>, model: &Model, value: &Value) -> Result<Value> {
    Ok(match value {
        Value::String(text) => Value::String(ctx.render(text, model)?),
        Value::Array(items) => Value::Array(
            items.iter().map(|item| render_value(ctx, model, item)).collect::<Result<_>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), render_value(ctx, model, v)?)))
                .collect::<Result<_>>()?,
        ),
        other => other.clone(),
    })
}

/// Renders the snippet and hands it to the project's POM recipes.
pub fn execute(
    ctx: &HandlerContext<'_>,
    model: &Model,
    target: MavenTarget,
    snippet: &MavenSnippet,
    body: &str,
) -> Result<ActionResult> {
    let pom = ctx.root.join(POM);
    if !ctx.effects.exists(&pom) {
        return Err(Error::Inject { path: pom, reason: "file does not exist".to_string() });
    }

    let text = match &snippet.text {
        Some(text) => Some(ctx.render(text, model)?),
        None if snippet.fields.is_empty() => Some(body.to_string()),
        None => None,
    };
    let fields = snippet
        .fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), render_value(ctx, model, value)?)))
        .collect::<Result<IndexMap<_, _>>>()?;

    ctx.maven.apply(&pom, target, &RenderedSnippet { text, fields })?;
    log::info!("Injected Maven {target} into {}", pom.display());
    Ok(ActionResult::success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::MemoryEffects;
    use crate::handlers::tests::context;
    use crate::renderer::MiniJinjaRenderer;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(MavenTarget, RenderedSnippet)>>);

    impl MavenRecipes for Recorder {
        fn apply(&self, _pom: &Path, target: MavenTarget, snippet: &RenderedSnippet) -> Result<()> {
            self.0.borrow_mut().push((target, snippet.clone()));
            Ok(())
        }
    }

    #[test]
    fn renders_fields_before_delegating() {
        let effects = MemoryEffects::new().with_file("/project/pom.xml", "<project/>");
        let renderer = MiniJinjaRenderer::new();
        let recorder = Recorder::default();
        let mut ctx = context(&effects, &renderer);
        ctx.maven = &recorder;
        let mut model = Model::new();
        model.set("starter", json!("web"));
        let snippet = MavenSnippet {
            text: None,
            fields: IndexMap::from([(
                "artifact-id".to_string(),
                json!("spring-boot-starter-{{starter}}"),
            )]),
        };

        execute(&ctx, &model, MavenTarget::Dependency, &snippet, "").unwrap();

        let calls = recorder.0.borrow();
        assert_eq!(calls[0].0, MavenTarget::Dependency);
        assert_eq!(calls[0].1.fields["artifact-id"], json!("spring-boot-starter-web"));
        assert_eq!(calls[0].1.text, None);
    }

    #[test]
    fn body_is_the_snippet_when_nothing_inline() {
        let effects = MemoryEffects::new().with_file("/project/pom.xml", "<project/>");
        let renderer = MiniJinjaRenderer::new();
        let recorder = Recorder::default();
        let mut ctx = context(&effects, &renderer);
        ctx.maven = &recorder;

        execute(&ctx, &Model::new(), MavenTarget::Repository, &MavenSnippet::default(), "<repo/>")
            .unwrap();

        assert_eq!(recorder.0.borrow()[0].1.text.as_deref(), Some("<repo/>"));
    }

    #[test]
    fn default_recipes_are_unsupported() {
        let effects = MemoryEffects::new().with_file("/project/pom.xml", "<project/>");
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);

        let err = execute(&ctx, &Model::new(), MavenTarget::BuildPlugin, &MavenSnippet::default(), "")
            .unwrap_err();

        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn missing_pom_is_an_error() {
        let effects = MemoryEffects::new();
        let renderer = MiniJinjaRenderer::new();
        let ctx = context(&effects, &renderer);

        let err = execute(&ctx, &Model::new(), MavenTarget::Dependency, &MavenSnippet::default(), "")
            .unwrap_err();

        assert!(matches!(err, Error::Inject { .. }));
    }
}
