//! The shared key/value model that templates, guards and handlers read
//! during one command invocation, and the populators that seed it.

mod maven;
mod role;
mod root_package;
mod system;

pub use maven::MavenModelPopulator;
pub use role::RoleModelPopulator;
pub use root_package::RootPackageModelPopulator;
pub use system::SystemModelPopulator;

use crate::effects::Effects;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Key/value context of one command invocation.
///
/// Populators only add keys ([`Model::set_if_absent`]); actions that declare
/// intent to redefine a variable use [`Model::set`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(Map<String, Value>);

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Inserts `key` only when it is not present yet. Returns whether the
    /// value was stored.
    pub fn set_if_absent(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Model {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Model {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A unit contributing entries to the model before any action runs.
///
/// Implementations must use set-if-absent semantics so that earlier
/// populators take priority.
pub trait ModelPopulator {
    fn name(&self) -> &'static str;

    fn contribute_to_model(&self, root: &Path, model: &mut Model) -> Result<()>;
}

/// The populators run for every command, in priority order.
pub fn default_populators<'a>(effects: &'a dyn Effects) -> Vec<Box<dyn ModelPopulator + 'a>> {
    vec![
        Box::new(SystemModelPopulator),
        Box::new(MavenModelPopulator),
        Box::new(RootPackageModelPopulator),
        Box::new(RoleModelPopulator::new(effects)),
    ]
}

/// Runs every populator once, in order, over `model`.
pub fn populate(
    root: &Path,
    populators: &[Box<dyn ModelPopulator + '_>],
    model: &mut Model,
) -> Result<()> {
    for populator in populators {
        log::debug!("Running model populator '{}'", populator.name());
        populator.contribute_to_model(root, model)?;
    }
    Ok(())
}

/// Converts a user-typed string into the most specific JSON scalar:
/// booleans, integers, floats, otherwise the string itself.
pub fn infer_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() && trimmed.contains('.') {
            return Value::from(float);
        }
    }
    Value::String(raw.to_string())
}
