//! Engine error taxonomy.
//!
//! Only structural failures are errors. A low-confidence recommendation is a
//! valid result, and a failed cycle always surfaces its taxonomy kind and a
//! human-readable reason -- never a placeholder recommendation.

use std::fmt;

use accord_storage::StorageError;

/// Errors raised by the decision synthesis engine.
#[derive(Debug)]
pub enum EngineError {
    /// The scenario failed structural validation. Rejected before any
    /// strategy generation; no decision record is ever created.
    InvalidScenario { message: String },
    /// No template is registered for the scenario kind. Surfaces as a
    /// failed decision with a closed, unsuccessful trace.
    StrategyGeneration { kind: String, message: String },
    /// The risk assessor produced an out-of-range score. Unreachable while
    /// every term is clamped; the taxonomy keeps the tag regardless.
    RiskComputation { message: String },
    /// The storage collaborator rejected an append. The records involved
    /// are retained in the recorder's pending buffer for retry.
    Persistence(StorageError),
}

impl EngineError {
    /// Stable taxonomy tag, used in trace error messages and rendering.
    pub fn taxonomy(&self) -> &'static str {
        match self {
            EngineError::InvalidScenario { .. } => "invalid-scenario",
            EngineError::StrategyGeneration { .. } => "strategy-generation-failure",
            EngineError::RiskComputation { .. } => "risk-computation-error",
            EngineError::Persistence(_) => "persistence-failure",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidScenario { message } => {
                write!(f, "invalid scenario: {}", message)
            }
            EngineError::StrategyGeneration { kind, message } => {
                write!(f, "strategy generation failed for kind '{}': {}", kind, message)
            }
            EngineError::RiskComputation { message } => {
                write!(f, "risk computation error: {}", message)
            }
            EngineError::Persistence(err) => {
                write!(f, "persistence failure: {}", err)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        EngineError::Persistence(err)
    }
}
