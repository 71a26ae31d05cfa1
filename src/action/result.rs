use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Failure,
    Skipped,
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStatus::Success => f.write_str("success"),
            ActionStatus::Failure => f.write_str("failure"),
            ActionStatus::Skipped => f.write_str("skipped"),
        }
    }
}

/// Result of one executed action.
///
/// `outcome` is what happened; `conclusion` is how the run treats it. They
/// differ only for best-effort actions, whose failures conclude as success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub outputs: IndexMap<String, Value>,
    pub outcome: ActionStatus,
    pub conclusion: ActionStatus,
}

impl ActionResult {
    pub fn success() -> Self {
        Self::with_status(ActionStatus::Success)
    }

    pub fn skipped() -> Self {
        Self::with_status(ActionStatus::Skipped)
    }

    fn with_status(status: ActionStatus) -> Self {
        Self { outputs: IndexMap::new(), outcome: status, conclusion: status }
    }

    /// A failure that does not stop the run.
    pub fn tolerated_failure() -> Self {
        Self {
            outputs: IndexMap::new(),
            outcome: ActionStatus::Failure,
            conclusion: ActionStatus::Success,
        }
    }

    pub fn with_output(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.outputs.insert(key.to_string(), value.into());
        self
    }
}
