//! Strategy generation: one mode-specific candidate plan per invocation.
//!
//! `generate` is a pure function of its inputs: no hidden state, no I/O, no
//! clock. The template registry is the single source of truth for narrative
//! content; an unregistered scenario kind is a hard failure, never an empty
//! strategy. The two per-cycle invocations (connected, local) share no
//! mutable state and can run concurrently.

use std::collections::BTreeSet;

use accord_core::{Mode, PatternCatalog, Scenario, Strategy, TemplateRegistry};

use crate::error::EngineError;

/// Generate the candidate strategy for one mode.
///
/// Confidence is the mode baseline (connected 0.92, local 0.78) unless the
/// template overrides it for this scenario kind. `patterns_applied` is the
/// id set of catalog patterns relevant to the scenario.
pub fn generate(
    scenario: &Scenario,
    mode: Mode,
    catalog: &PatternCatalog,
    registry: &TemplateRegistry,
) -> Result<Strategy, EngineError> {
    let template = registry
        .resolve(&scenario.kind)
        .ok_or_else(|| EngineError::StrategyGeneration {
            kind: scenario.kind.to_string(),
            message: "no template registered for scenario kind".to_string(),
        })?;
    let mode_template = template.for_mode(mode);

    let patterns_applied: BTreeSet<String> = catalog
        .relevant(scenario)
        .into_iter()
        .map(|p| p.id)
        .collect();

    let confidence = mode_template
        .confidence_override
        .unwrap_or_else(|| mode.baseline());

    Ok(Strategy {
        mode,
        confidence,
        steps: mode_template.steps.clone(),
        reasoning: mode_template.reasoning.clone(),
        advantages: mode_template.advantages.clone(),
        limitations: mode_template.limitations.clone(),
        patterns_applied,
        summary: mode_template.summary.clone(),
    })
}
