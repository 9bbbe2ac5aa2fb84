//! Accord decision synthesis engine -- accepts a scenario, produces a hybrid
//! recommendation with a persisted decision + trace.
//!
//! One `process_scenario` cycle runs the full pipeline:
//!
//! 1. Validate the scenario (structural failure here never creates a record)
//! 2. Open a decision in `processing` with an open trace
//! 3. Generate a connected-mode and a local-mode strategy -- pure, mutually
//!    independent, run concurrently
//! 4. Score risk over the scenario and the strategy pair
//! 5. Synthesize the pair into one recommendation under the risk assessment
//! 6. Record pattern usage, terminate the decision, append to history
//!
//! The engine performs no blocking I/O; the only async boundary is the
//! injected `DecisionStore`.

pub mod error;
pub mod generate;
pub mod recorder;
pub mod render;
pub mod report;
pub mod risk;
pub mod synthesize;

pub use error::EngineError;
pub use generate::generate;
pub use recorder::{AppendReceipt, DecisionRecorder, OpenDecision, RecorderConfig};
pub use render::{ConsoleRenderer, DecisionRenderer};
pub use report::{generate_sync_report, SyncCapabilities, SyncCapability, SyncReport};
pub use risk::{assess, RiskAssessment};
pub use synthesize::{synthesize, Recommendation, SynthesisPolicy};

use accord_core::{Mode, PatternCatalog, Scenario, Strategy, TemplateRegistry};
use accord_storage::{DecisionRecord, DecisionStore, TraceRecord};

/// The two candidate strategies of one cycle.
#[derive(Debug, Clone)]
pub struct StrategyPair {
    pub connected: Strategy,
    pub local: Strategy,
}

/// Everything one successful cycle produced.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub decision: DecisionRecord,
    pub trace: TraceRecord,
    pub strategies: StrategyPair,
    pub recommendation: Recommendation,
    /// Non-fatal notes: unknown pattern ids during usage recording, append
    /// failures retained for retry.
    pub warnings: Vec<String>,
}

/// A failed cycle. The decision and trace are attached when they exist:
/// an invalid scenario never creates them; a generation failure produces a
/// `failed` decision with a closed, unsuccessful trace.
#[derive(Debug)]
pub struct ProcessFailure {
    pub error: EngineError,
    pub decision: Option<DecisionRecord>,
    pub trace: Option<TraceRecord>,
}

impl std::fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for ProcessFailure {}

/// Run one full decision cycle for a scenario.
///
/// The two strategy generations are pure and joined before risk assessment;
/// the catalog is only written after synthesis, through its own lock.
pub async fn process_scenario<S: DecisionStore>(
    scenario: &Scenario,
    catalog: &PatternCatalog,
    registry: &TemplateRegistry,
    recorder: &DecisionRecorder<S>,
    policy: &SynthesisPolicy,
) -> Result<ScenarioOutcome, ProcessFailure> {
    if let Err(message) = scenario.validate() {
        return Err(ProcessFailure {
            error: EngineError::InvalidScenario { message },
            decision: None,
            trace: None,
        });
    }

    let open = recorder.begin(scenario);

    // Independent mode generations, joined at the risk boundary.
    let (connected, local) = tokio::join!(
        async { generate(scenario, Mode::Connected, catalog, registry) },
        async { generate(scenario, Mode::Local, catalog, registry) },
    );
    let (connected, local) = match (connected, local) {
        (Ok(c), Ok(l)) => (c, l),
        (Err(error), _) | (_, Err(error)) => {
            let receipt = recorder.fail(open, &error).await;
            return Err(ProcessFailure {
                error,
                decision: Some(receipt.decision),
                trace: Some(receipt.trace),
            });
        }
    };

    // The kind resolved during generation, so the registry entry exists.
    let risk_class = registry
        .resolve(&scenario.kind)
        .map(|t| t.risk)
        .unwrap_or_default();
    let risk = assess(scenario, risk_class, &connected, &local);
    let recommendation = synthesize(&connected, &local, &risk, policy);

    let mut warnings = Vec::new();
    let now = recorder::now_rfc3339();
    for pattern_id in &recommendation.patterns_applied {
        if !catalog.record_usage(pattern_id, &now) {
            warnings.push(format!(
                "usage recorded for unknown pattern id '{pattern_id}'"
            ));
        }
    }

    let receipt = recorder.complete(open, &recommendation).await;
    if let Some(err) = receipt.store_error {
        warnings.push(format!("history append failed, retained for retry: {err}"));
    }

    Ok(ScenarioOutcome {
        decision: receipt.decision,
        trace: receipt.trace,
        strategies: StrategyPair { connected, local },
        recommendation,
        warnings,
    })
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
