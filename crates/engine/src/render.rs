//! Rendering collaborator.
//!
//! The engine itself never prints. Callers hand finished outcomes to a
//! `DecisionRenderer`; the console implementation here is the reference
//! sink, replaceable by any UI or log collector.

use std::io::{self, Write};

use crate::report::SyncReport;
use crate::ScenarioOutcome;

/// Boundary sink for finished decision cycles and reports.
pub trait DecisionRenderer {
    fn render_outcome(&self, outcome: &ScenarioOutcome);
    fn render_report(&self, report: &SyncReport);
    /// Non-fatal engine warnings (e.g. usage recorded for an unknown
    /// pattern id).
    fn warn(&self, message: &str);
}

/// Writes outcomes to stdout in a terminal-friendly layout.
pub struct ConsoleRenderer;

impl DecisionRenderer for ConsoleRenderer {
    fn render_outcome(&self, outcome: &ScenarioOutcome) {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        let d = &outcome.decision;
        let r = &outcome.recommendation;
        let _ = writeln!(out);
        let _ = writeln!(out, "  Decision {} [{}]", d.id, d.status);
        let _ = writeln!(out, "  Question: {}", d.question);
        let _ = writeln!(out, "  Recommendation: {}", r.text);
        let _ = writeln!(
            out,
            "  Confidence {:.3} | risk {} | approval {}",
            r.confidence,
            r.risk_level,
            if r.approval_required { "required" } else { "not required" }
        );
        for (mode, strategy) in [
            ("connected", &outcome.strategies.connected),
            ("local", &outcome.strategies.local),
        ] {
            let _ = writeln!(
                out,
                "  {} ({:.2}): {}",
                mode, strategy.confidence, strategy.summary
            );
        }
        if !r.patterns_applied.is_empty() {
            let ids: Vec<&str> = r.patterns_applied.iter().map(|s| s.as_str()).collect();
            let _ = writeln!(out, "  Patterns: [{}]", ids.join(", "));
        }
        for warning in &outcome.warnings {
            let _ = writeln!(out, "  warning: {}", warning);
        }
        let _ = writeln!(out);
    }

    fn render_report(&self, report: &SyncReport) {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {} decisions, {} traces, {} patterns loaded",
            report.total_decisions, report.total_traces, report.patterns_loaded
        );
        let _ = writeln!(out, "  Average confidence: {:.3}", report.avg_confidence);
        for rec in &report.recommendations {
            let _ = writeln!(out, "  - {}", rec);
        }
        let _ = writeln!(out);
    }

    fn warn(&self, message: &str) {
        eprintln!("warning: {}", message);
    }
}
