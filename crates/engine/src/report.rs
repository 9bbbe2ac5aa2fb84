//! Sync reporting over the decision history.
//!
//! Aggregates the append-only history into totals plus static descriptors
//! of how an offline and an online decision history could be reconciled.
//! The capability descriptors are data about the engine's design, not
//! measurements; only the totals and recommendations derive from history.

use accord_storage::{DecisionStatus, HistoryEntry, SyncStatus};
use serde::{Deserialize, Serialize};

/// How one direction of history reconciliation would work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncCapability {
    pub supported: bool,
    pub mechanism: String,
    /// Confidence that the mechanism preserves history semantics, 0..=1.
    pub confidence: f64,
    pub requirements: Vec<String>,
}

/// The three reconciliation directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncCapabilities {
    pub offline_to_online: SyncCapability,
    pub online_to_offline: SyncCapability,
    pub bidirectional: SyncCapability,
}

impl SyncCapabilities {
    /// The engine's static capability descriptors.
    pub fn descriptors() -> Self {
        SyncCapabilities {
            offline_to_online: SyncCapability {
                supported: true,
                mechanism: "replay the local decision log against the connected store in sequence order".to_string(),
                confidence: 0.9,
                requirements: vec![
                    "stable decision ids".to_string(),
                    "connected store credentials".to_string(),
                ],
            },
            online_to_offline: SyncCapability {
                supported: true,
                mechanism: "export a connected history snapshot to seed the local catalog and history".to_string(),
                confidence: 0.85,
                requirements: vec![
                    "snapshot export access".to_string(),
                    "local storage capacity".to_string(),
                ],
            },
            bidirectional: SyncCapability {
                supported: true,
                mechanism: "merge keyed by decision id with conflicting entries flagged for review".to_string(),
                confidence: 0.8,
                requirements: vec![
                    "stable decision ids".to_string(),
                    "conflict review workflow".to_string(),
                ],
            },
        }
    }
}

/// Aggregate view of a decision history plus reconciliation guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub total_decisions: usize,
    pub total_traces: usize,
    pub patterns_loaded: usize,
    /// Mean confidence over decisions that carry one; 0.0 for an empty
    /// history, never NaN.
    pub avg_confidence: f64,
    pub sync_capabilities: SyncCapabilities,
    pub recommendations: Vec<String>,
}

/// Build a sync report from the history and catalog stats.
pub fn generate_sync_report(
    history: &[HistoryEntry],
    total_traces: usize,
    patterns_loaded: usize,
) -> SyncReport {
    let confidences: Vec<f64> = history
        .iter()
        .filter_map(|e| e.decision.confidence)
        .collect();
    let avg_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    let conflicts = history
        .iter()
        .filter(|e| e.decision.sync_status == SyncStatus::Conflict)
        .count();
    let pending = history
        .iter()
        .filter(|e| e.decision.sync_status == SyncStatus::Pending)
        .count();
    let failed = history
        .iter()
        .filter(|e| e.decision.status == DecisionStatus::Failed)
        .count();

    let mut recommendations = Vec::new();
    if history.is_empty() {
        recommendations
            .push("no decisions recorded yet; process a scenario to build history".to_string());
    } else {
        if avg_confidence < 0.7 {
            recommendations
                .push("average confidence is low; review decisions before syncing".to_string());
        }
        if conflicts > 0 {
            recommendations.push(format!(
                "{conflicts} decision(s) in sync conflict; resolve before bidirectional sync"
            ));
        }
        if pending > 0 {
            recommendations.push(format!("{pending} decision(s) awaiting sync"));
        }
        if failed > 0 {
            recommendations.push(format!(
                "{failed} failed decision(s) in history; inspect their traces"
            ));
        }
    }

    SyncReport {
        total_decisions: history.len(),
        total_traces,
        patterns_loaded,
        avg_confidence,
        sync_capabilities: SyncCapabilities::descriptors(),
        recommendations,
    }
}
