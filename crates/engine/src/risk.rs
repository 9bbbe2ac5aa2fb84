//! Risk scoring for a candidate strategy pair.
//!
//! An additive heuristic over scenario shape and strategy disagreement.
//! Every term and the final score are clamped to [0,1], so the computation
//! cannot fail regardless of inputs.

use accord_core::{RiskClass, Scenario, Strategy};
use accord_storage::RiskLevel;
use serde::{Deserialize, Serialize};

/// Base risk carried by any scenario.
const BASE: f64 = 0.3;
/// Added when the scenario kind creates or restructures repositories.
const REPOSITORY_CLASS: f64 = 0.2;
/// Added when more than this many credentials are in play.
const CREDENTIAL_THRESHOLD: usize = 2;
const CREDENTIAL_TERM: f64 = 0.1;
/// Added when constraints + requirements exceed this count.
const OBLIGATION_THRESHOLD: usize = 5;
const OBLIGATION_TERM: f64 = 0.1;
/// Added when the two strategies disagree by more than this much.
const DISAGREEMENT_THRESHOLD: f64 = 0.15;
const DISAGREEMENT_TERM: f64 = 0.1;

/// Score above which the approval gate engages.
const APPROVAL_THRESHOLD: f64 = 0.6;

/// Bounded risk estimate for acting on a recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Heuristic score in [0,1].
    pub score: f64,
    pub level: RiskLevel,
    /// True when the score exceeds 0.6 or the kind is high-sensitivity.
    pub approval_required: bool,
}

/// Score the risk of acting on the given strategy pair.
///
/// `risk_class` comes from the template registry entry for the scenario's
/// kind -- the registry is the single authority on kind classification.
pub fn assess(
    scenario: &Scenario,
    risk_class: RiskClass,
    connected: &Strategy,
    local: &Strategy,
) -> RiskAssessment {
    let mut score = clamp(BASE);
    if risk_class.repository_class {
        score += clamp(REPOSITORY_CLASS);
    }
    if scenario.credentials.len() > CREDENTIAL_THRESHOLD {
        score += clamp(CREDENTIAL_TERM);
    }
    if scenario.obligation_count() > OBLIGATION_THRESHOLD {
        score += clamp(OBLIGATION_TERM);
    }
    if (connected.confidence - local.confidence).abs() > DISAGREEMENT_THRESHOLD {
        score += clamp(DISAGREEMENT_TERM);
    }
    let score = clamp(score);

    RiskAssessment {
        score,
        level: level_for(score),
        approval_required: score > APPROVAL_THRESHOLD || risk_class.high_sensitivity,
    }
}

/// Threshold mapping: >0.7 high, >0.4 medium, else low.
pub fn level_for(score: f64) -> RiskLevel {
    if score > 0.7 {
        RiskLevel::High
    } else if score > 0.4 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn clamp(term: f64) -> f64 {
    term.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_core::{Mode, ScenarioKind};
    use std::collections::{BTreeMap, BTreeSet};

    fn strategy(mode: Mode, confidence: f64) -> Strategy {
        Strategy {
            mode,
            confidence,
            steps: vec!["step".to_string()],
            reasoning: Vec::new(),
            advantages: Vec::new(),
            limitations: Vec::new(),
            patterns_applied: BTreeSet::new(),
            summary: "s".to_string(),
        }
    }

    fn scenario(credentials: usize, obligations: usize) -> Scenario {
        let mut creds = BTreeMap::new();
        for i in 0..credentials {
            creds.insert(format!("cred-{i}"), "redacted".to_string());
        }
        Scenario {
            name: "n".to_string(),
            kind: ScenarioKind::from("repository-creation"),
            context: "c".to_string(),
            requirement: "r".to_string(),
            credentials: creds,
            constraints: (0..obligations).map(|i| format!("req-{i}")).collect(),
            requirements: Vec::new(),
        }
    }

    #[test]
    fn base_scenario_is_low_risk() {
        let a = assess(
            &scenario(0, 0),
            RiskClass::default(),
            &strategy(Mode::Connected, 0.92),
            &strategy(Mode::Local, 0.78),
        );
        // 0.3 base only: gap 0.14 is not > 0.15.
        assert!((a.score - 0.3).abs() < 1e-9);
        assert_eq!(a.level, RiskLevel::Low);
        assert!(!a.approval_required);
    }

    #[test]
    fn worked_example_from_repository_creation() {
        // repository-class kind, 2 credentials, 7 obligations, gap 0.14:
        // 0.3 + 0.2 + 0 + 0.1 + 0 = 0.6 -> medium, approval NOT required.
        let a = assess(
            &scenario(2, 7),
            RiskClass {
                repository_class: true,
                high_sensitivity: false,
            },
            &strategy(Mode::Connected, 0.92),
            &strategy(Mode::Local, 0.78),
        );
        assert!((a.score - 0.6).abs() < 1e-9);
        assert_eq!(a.level, RiskLevel::Medium);
        assert!(!a.approval_required, "0.6 is not > 0.6");
    }

    #[test]
    fn all_terms_stack_and_clamp_holds() {
        let a = assess(
            &scenario(3, 6),
            RiskClass {
                repository_class: true,
                high_sensitivity: false,
            },
            &strategy(Mode::Connected, 0.95),
            &strategy(Mode::Local, 0.5),
        );
        assert!((a.score - 0.8).abs() < 1e-9);
        assert_eq!(a.level, RiskLevel::High);
        assert!(a.approval_required);
        assert!(a.score <= 1.0);
    }

    #[test]
    fn credential_threshold_is_strictly_more_than_two() {
        let two = assess(
            &scenario(2, 0),
            RiskClass::default(),
            &strategy(Mode::Connected, 0.9),
            &strategy(Mode::Local, 0.9),
        );
        let three = assess(
            &scenario(3, 0),
            RiskClass::default(),
            &strategy(Mode::Connected, 0.9),
            &strategy(Mode::Local, 0.9),
        );
        assert!((two.score - 0.3).abs() < 1e-9);
        assert!((three.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn disagreement_term_needs_gap_above_threshold() {
        let narrow = assess(
            &scenario(0, 0),
            RiskClass::default(),
            &strategy(Mode::Connected, 0.92),
            &strategy(Mode::Local, 0.78),
        );
        let wide = assess(
            &scenario(0, 0),
            RiskClass::default(),
            &strategy(Mode::Connected, 0.95),
            &strategy(Mode::Local, 0.70),
        );
        assert!((narrow.score - 0.3).abs() < 1e-9);
        assert!((wide.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn high_sensitivity_forces_approval_at_any_score() {
        let a = assess(
            &scenario(0, 0),
            RiskClass {
                repository_class: false,
                high_sensitivity: true,
            },
            &strategy(Mode::Connected, 0.9),
            &strategy(Mode::Local, 0.9),
        );
        assert_eq!(a.level, RiskLevel::Low);
        assert!(a.approval_required);
    }

    #[test]
    fn level_thresholds_are_exact() {
        assert_eq!(level_for(0.4), RiskLevel::Low);
        assert_eq!(level_for(0.41), RiskLevel::Medium);
        assert_eq!(level_for(0.7), RiskLevel::Medium);
        assert_eq!(level_for(0.71), RiskLevel::High);
    }

    #[test]
    fn score_always_in_unit_interval() {
        let a = assess(
            &scenario(10, 50),
            RiskClass {
                repository_class: true,
                high_sensitivity: true,
            },
            &strategy(Mode::Connected, 1.0),
            &strategy(Mode::Local, 0.0),
        );
        assert!(a.score >= 0.0 && a.score <= 1.0);
    }
}
