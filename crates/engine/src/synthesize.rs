//! Synthesis: blend the two candidate strategies into one hybrid
//! recommendation with governance metadata.
//!
//! The blend is policy, not computed from strategy content: develop in the
//! lower-risk (local) mode, validate and deploy through the higher-access
//! (connected) mode. The confidence math rewards having two independent
//! corroborating strategies with a bounded bonus.

use std::collections::BTreeSet;

use accord_core::{Mode, Strategy};
use accord_storage::RiskLevel;
use serde::{Deserialize, Serialize};

use crate::risk::RiskAssessment;

/// Weight of the connected-mode confidence in the blend.
const CONNECTED_WEIGHT: f64 = 0.6;
/// Weight of the local-mode confidence in the blend.
const LOCAL_WEIGHT: f64 = 0.4;
/// Bonus for having two independent corroborating strategies.
const SYNTHESIS_BONUS: f64 = 0.05;
/// Synthesis can never claim near-certainty.
const CONFIDENCE_CAP: f64 = 0.95;

/// Injectable synthesis configuration: the guiding principles emitted as
/// `philosophy_alignment`. A static list, not hardcoded prose inside the
/// synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisPolicy {
    pub principles: Vec<String>,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        SynthesisPolicy {
            principles: vec![
                "execution discipline".to_string(),
                "progressive enhancement".to_string(),
                "test before deploy".to_string(),
                "separation of concerns".to_string(),
            ],
        }
    }
}

/// The engine's final hybrid output, including governance fields.
/// Immutable once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub reasoning: String,
    /// Blended confidence, capped at 0.95.
    pub confidence: f64,
    pub insights: Vec<String>,
    /// Union of both strategies' applied pattern ids.
    pub patterns_applied: BTreeSet<String>,
    pub philosophy_alignment: Vec<String>,
    pub branch_strategy: String,
    pub deployment_plan: String,
    pub environment_handling: String,
    pub approval_required: bool,
    pub risk_level: RiskLevel,
}

/// Blend the connected and local strategies under the risk assessment.
pub fn synthesize(
    connected: &Strategy,
    local: &Strategy,
    risk: &RiskAssessment,
    policy: &SynthesisPolicy,
) -> Recommendation {
    // Weighted blend first, bonus second, cap last: the bonus can be wasted
    // against the cap but never pushes past it.
    let combined = CONNECTED_WEIGHT * connected.confidence + LOCAL_WEIGHT * local.confidence;
    let confidence = (combined + SYNTHESIS_BONUS).min(CONFIDENCE_CAP);

    let patterns_applied: BTreeSet<String> = connected
        .patterns_applied
        .union(&local.patterns_applied)
        .cloned()
        .collect();

    let develop = Mode::Local;
    let validate = Mode::Connected;

    let text = format!(
        "Develop in {develop} mode, then validate and deploy through {validate} mode."
    );
    let reasoning = format!(
        "{develop} mode bounds the blast radius during development; {validate} mode \
         retains live-environment access for validation and rollout. Two independently \
         generated strategies corroborate the plan."
    );

    let gap = (connected.confidence - local.confidence).abs();
    let mut insights = vec![
        format!("{} reusable pattern(s) applied across both strategies", patterns_applied.len()),
        format!("mode confidence gap is {gap:.2}"),
        format!("risk scored {:.2} ({})", risk.score, risk.level),
    ];
    if risk.approval_required {
        insights.push("human approval required before execution".to_string());
    }

    Recommendation {
        text,
        reasoning,
        confidence,
        insights,
        patterns_applied,
        philosophy_alignment: policy.principles.clone(),
        branch_strategy: format!(
            "Work on a {develop} branch, merge to an integration branch once {develop} \
             checks pass, then promote to main."
        ),
        deployment_plan: format!(
            "Integration branch deploys to a preview environment; production promotion \
             happens from {validate} mode after preview verification."
        ),
        environment_handling: format!(
            "{develop} mode runs against sandboxed credentials; {validate} mode uses \
             live credentials only for the validation and deployment phases."
        ),
        approval_required: risk.approval_required,
        risk_level: risk.level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_storage::RiskLevel;
    use std::collections::BTreeSet;

    fn strategy(mode: Mode, confidence: f64, patterns: &[&str]) -> Strategy {
        Strategy {
            mode,
            confidence,
            steps: vec!["step".to_string()],
            reasoning: Vec::new(),
            advantages: Vec::new(),
            limitations: Vec::new(),
            patterns_applied: patterns.iter().map(|s| s.to_string()).collect(),
            summary: "s".to_string(),
        }
    }

    fn low_risk() -> RiskAssessment {
        RiskAssessment {
            score: 0.3,
            level: RiskLevel::Low,
            approval_required: false,
        }
    }

    #[test]
    fn worked_example_blend() {
        // 0.6*0.92 + 0.4*0.78 = 0.864; +0.05 = 0.914, under the cap.
        let r = synthesize(
            &strategy(Mode::Connected, 0.92, &[]),
            &strategy(Mode::Local, 0.78, &[]),
            &low_risk(),
            &SynthesisPolicy::default(),
        );
        assert!((r.confidence - 0.914).abs() < 1e-9);
    }

    #[test]
    fn cap_applies_after_bonus() {
        // 0.6*0.95 + 0.4*0.93 = 0.942; +0.05 = 0.992 -> capped at 0.95.
        let r = synthesize(
            &strategy(Mode::Connected, 0.95, &[]),
            &strategy(Mode::Local, 0.93, &[]),
            &low_risk(),
            &SynthesisPolicy::default(),
        );
        assert_eq!(r.confidence, 0.95);
    }

    #[test]
    fn confidence_never_exceeds_cap() {
        for (c, l) in [(1.0, 1.0), (0.0, 0.0), (0.9, 0.99), (0.96, 0.1)] {
            let r = synthesize(
                &strategy(Mode::Connected, c, &[]),
                &strategy(Mode::Local, l, &[]),
                &low_risk(),
                &SynthesisPolicy::default(),
            );
            assert!(r.confidence >= 0.0 && r.confidence <= 0.95);
        }
    }

    #[test]
    fn patterns_union_deduplicates() {
        let r = synthesize(
            &strategy(Mode::Connected, 0.9, &["a", "b"]),
            &strategy(Mode::Local, 0.8, &["b", "c"]),
            &low_risk(),
            &SynthesisPolicy::default(),
        );
        let expected: BTreeSet<String> =
            ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(r.patterns_applied, expected);
    }

    #[test]
    fn risk_fields_copied_unchanged() {
        let risk = RiskAssessment {
            score: 0.8,
            level: RiskLevel::High,
            approval_required: true,
        };
        let r = synthesize(
            &strategy(Mode::Connected, 0.9, &[]),
            &strategy(Mode::Local, 0.8, &[]),
            &risk,
            &SynthesisPolicy::default(),
        );
        assert_eq!(r.risk_level, RiskLevel::High);
        assert!(r.approval_required);
        assert!(r.insights.iter().any(|i| i.contains("approval")));
    }

    #[test]
    fn philosophy_comes_from_the_policy() {
        let policy = SynthesisPolicy {
            principles: vec!["ship small".to_string()],
        };
        let r = synthesize(
            &strategy(Mode::Connected, 0.9, &[]),
            &strategy(Mode::Local, 0.8, &[]),
            &low_risk(),
            &policy,
        );
        assert_eq!(r.philosophy_alignment, vec!["ship small".to_string()]);
    }

    #[test]
    fn narrative_is_parameterized_by_mode_names() {
        let r = synthesize(
            &strategy(Mode::Connected, 0.9, &[]),
            &strategy(Mode::Local, 0.8, &[]),
            &low_risk(),
            &SynthesisPolicy::default(),
        );
        assert!(r.text.contains("local"));
        assert!(r.text.contains("connected"));
        assert!(r.branch_strategy.contains("integration branch"));
        assert!(r.deployment_plan.contains("preview"));
    }
}
