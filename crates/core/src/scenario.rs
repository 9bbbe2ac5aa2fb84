//! Scenario input descriptor.
//!
//! A `Scenario` is the caller-constructed description of a task the engine
//! reasons about. It is immutable once built; the engine never writes back
//! into it. Structural validation happens here so that a malformed scenario
//! is rejected before any decision record is created.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification tag for a scenario, e.g. `"repository-creation"`.
///
/// Kinds are open-ended strings rather than a closed enum: the template
/// registry decides which kinds are known, and an unregistered kind is a
/// hard generation failure rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioKind(pub String);

impl ScenarioKind {
    pub fn new(kind: impl Into<String>) -> Self {
        ScenarioKind(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScenarioKind {
    fn from(s: &str) -> Self {
        ScenarioKind(s.to_string())
    }
}

/// A task scenario submitted for decision synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Classification tag used to resolve the strategy template.
    pub kind: ScenarioKind,
    /// Free-text description of the surrounding situation.
    pub context: String,
    /// What the caller wants done.
    pub requirement: String,
    /// Credential names available to the task, keyed by credential id.
    /// Values are opaque to the engine; only the count feeds risk scoring.
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
    /// Hard constraints on any acceptable plan.
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Softer requirements; combined with constraints for risk scoring.
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl Scenario {
    /// Structural validation: `name`, `requirement` and `context` must be
    /// non-empty. A scenario failing this check must never reach strategy
    /// generation and must never produce a decision record.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("scenario name is empty".to_string());
        }
        if self.requirement.trim().is_empty() {
            return Err(format!("scenario '{}' has no requirement", self.name));
        }
        if self.context.trim().is_empty() {
            return Err(format!("scenario '{}' has no context", self.name));
        }
        Ok(())
    }

    /// The scenario-side text blob used for pattern relevance matching:
    /// `name + requirement + context`, lowercased.
    pub fn relevance_blob(&self) -> String {
        let mut blob = String::with_capacity(
            self.name.len() + self.requirement.len() + self.context.len() + 2,
        );
        blob.push_str(&self.name);
        blob.push(' ');
        blob.push_str(&self.requirement);
        blob.push(' ');
        blob.push_str(&self.context);
        blob.to_lowercase()
    }

    /// Count of constraints and requirements combined, for risk scoring.
    pub fn obligation_count(&self) -> usize {
        self.constraints.len() + self.requirements.len()
    }
}
