//! The optional `command.yaml` describing a command or subcommand.

use crate::error::{Error, Result};
use crate::model::infer_value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CommandManifest {
    pub command: Command,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Command {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

/// One user-facing option of a command.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub param_label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// One of `string`, `int`, `integer`, `long`, `short`, `bool`,
    /// `boolean`, `double`, `float`. Defaults to `string`.
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub choices: IndexMap<String, String>,
    #[serde(default)]
    pub required: bool,
}

impl CommandOption {
    /// Converts a raw argument into the declared type. Options without a
    /// data type are inferred like any other user-typed value.
    pub fn convert(&self, raw: &str) -> Result<Value> {
        let invalid = |expected: &str| Error::InvalidOption {
            name: self.name.clone(),
            value: raw.to_string(),
            reason: format!("expected {expected}"),
        };
        let trimmed = raw.trim();
        let data_type = self.data_type.as_deref().map(|t| t.trim().to_ascii_lowercase());
        match data_type.as_deref() {
            None | Some("") => Ok(infer_value(raw)),
            Some("string") => Ok(Value::String(raw.to_string())),
            Some("int" | "integer" | "long" | "short") => {
                trimmed.parse::<i64>().map(Value::from).map_err(|_| invalid("an integer"))
            }
            Some("bool" | "boolean") => {
                trimmed.parse::<bool>().map(Value::Bool).map_err(|_| invalid("true or false"))
            }
            Some("double" | "float") => {
                trimmed.parse::<f64>().map(Value::from).map_err(|_| invalid("a number"))
            }
            Some(other) => {
                log::warn!("Unknown data type '{other}' for option '{}'", self.name);
                Ok(infer_value(raw))
            }
        }
    }
}

impl CommandManifest {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let manifest: Option<Self> = serde_yaml::from_str(&text).map_err(|e| {
            Error::InvalidAction { path: path.display().to_string(), reason: e.to_string() }
        })?;
        Ok(manifest.unwrap_or_default())
    }
}
