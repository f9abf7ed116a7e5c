//! Module results in the JSON shape automation hosts read from stdout.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::update::UpdateOutcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansible_facts: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ModuleResult {
    pub fn from_outcome(outcome: UpdateOutcome) -> Self {
        Self {
            changed: outcome.changed(),
            ..Self::default()
        }
    }

    /// Facts never change anything on the vault.
    pub fn facts(facts: Map<String, Value>) -> Self {
        Self {
            ansible_facts: Some(facts),
            ..Self::default()
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: Some(msg.into()),
            ..Self::default()
        }
    }

    /// Process exit status for this result.
    pub fn exit_code(&self) -> i32 {
        if self.failed {
            1
        } else {
            0
        }
    }
}
