//! Conformance test suite for `DecisionStore` implementations.
//!
//! A backend-agnostic suite any `DecisionStore` implementation can run to
//! verify it honors the trait's contract:
//!
//! - **Append**: monotonic sequence numbers, history order == append order,
//!   duplicate id rejection
//! - **Query**: id lookup, filter semantics, trace scoping, miss variants
//! - **Concurrent**: no entry lost or reordered under parallel appends
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function
//! that creates a fresh, empty store for each test:
//!
//! ```ignore
//! use accord_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn my_backend_conformance() {
//!     let report = run_conformance_suite(|| async { MyStore::connect().await }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod append;
mod concurrent;
mod query;

use std::fmt;
use std::future::Future;

use crate::record::{DecisionRecord, DecisionStatus, SyncStatus, TraceRecord};
use crate::DecisionStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "append", "query", "concurrent").
    pub category: String,
    /// Test name (e.g. "seq_is_strictly_monotonic").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(append::run_append_tests(&factory).await);
    results.extend(query::run_query_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        failed: total - passed,
        passed,
        total,
        results,
    }
}

// ── Record factories shared by the test modules ─────────────────────────────

pub(super) fn make_decision(id: &str) -> DecisionRecord {
    DecisionRecord {
        id: id.to_string(),
        context: "conformance context".to_string(),
        question: "conformance question".to_string(),
        recommendation: None,
        reasoning: None,
        confidence: None,
        insights: Vec::new(),
        patterns: Vec::new(),
        timestamp: "2026-01-01T00:00:00Z".to_string(),
        execution_time_ms: None,
        status: DecisionStatus::Processing,
        philosophy_alignment: Vec::new(),
        source: "conformance".to_string(),
        tenant_id: None,
        metadata: serde_json::Value::Null,
        trace_id: format!("trc-{id}"),
        parent_decision_id: None,
        branch_strategy: None,
        deployment_plan: None,
        environment_handling: None,
        approval_required: None,
        risk_assessment: None,
        sync_status: SyncStatus::Pending,
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

pub(super) fn make_completed_decision(id: &str) -> DecisionRecord {
    let mut d = make_decision(id);
    d.status = DecisionStatus::Completed;
    d.confidence = Some(0.9);
    d.recommendation = Some("conformance recommendation".to_string());
    d
}

pub(super) fn make_trace(trace_id: &str, decision_id: &str) -> TraceRecord {
    TraceRecord {
        trace_id: trace_id.to_string(),
        decision_id: decision_id.to_string(),
        operation: "process_scenario".to_string(),
        query_text: None,
        parameters: serde_json::Value::Null,
        start_time: "2026-01-01T00:00:00Z".to_string(),
        end_time: Some("2026-01-01T00:00:01Z".to_string()),
        duration_ms: Some(1000),
        success: Some(true),
        error_message: None,
        metadata: serde_json::Value::Null,
        branch_id: None,
        environment: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    }
}
