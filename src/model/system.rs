use super::{Model, ModelPopulator};
use crate::error::Result;
use serde_json::{Map, Value};
use std::path::Path;

/// Contributes time, OS and environment values.
pub struct SystemModelPopulator;

impl ModelPopulator for SystemModelPopulator {
    fn name(&self) -> &'static str {
        "system"
    }

    fn contribute_to_model(&self, _root: &Path, model: &mut Model) -> Result<()> {
        let now = chrono::Local::now().format("%a %b %d %H:%M:%S %Z %Y").to_string();
        model.set_if_absent("now", Value::String(now));

        let environment: Map<String, Value> =
            std::env::vars().map(|(k, v)| (k, Value::String(v))).collect();
        model.set_if_absent("system-environment", Value::Object(environment));

        model.set_if_absent(
            "tmp-dir",
            Value::String(std::env::temp_dir().to_string_lossy().into_owned()),
        );
        model.set_if_absent(
            "file-separator",
            Value::String(std::path::MAIN_SEPARATOR.to_string()),
        );
        model.set_if_absent("os-name", Value::String(std::env::consts::OS.to_string()));

        if let Ok(user) = std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
            model.set_if_absent("user-name", Value::String(user));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contributes_system_values_without_overwriting() {
        let mut model = Model::new();
        model.set("os-name", json!("plan9"));
        SystemModelPopulator.contribute_to_model(Path::new("."), &mut model).unwrap();

        assert_eq!(model.get("os-name"), Some(&json!("plan9")));
        assert!(model.contains_key("now"));
        assert!(model.contains_key("tmp-dir"));
        assert!(model.get("system-environment").is_some_and(Value::is_object));
    }
}
