use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Lifecycle state of a decision record.
///
/// Legal transitions: `Processing -> Completed` and `Processing -> Failed`,
/// each exactly once. A terminal decision never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Processing,
    Completed,
    Failed,
}

impl DecisionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DecisionStatus::Completed | DecisionStatus::Failed)
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionStatus::Processing => "processing",
            DecisionStatus::Completed => "completed",
            DecisionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Reconciliation state of a decision relative to a remote history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Processing,
    Synced,
    Conflict,
}

/// Bounded risk classification attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// The persisted audit record of one synthesis cycle.
///
/// Recommendation-bearing fields are `None` while the decision is in
/// `Processing` and are populated exactly once on completion; a completed
/// record with missing recommendation fields is unrepresentable through the
/// recorder API. All timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: String,
    /// Scenario context the decision was made in.
    pub context: String,
    /// The scenario requirement, i.e. the question put to the engine.
    pub question: String,
    pub recommendation: Option<String>,
    pub reasoning: Option<String>,
    pub confidence: Option<f64>,
    pub insights: Vec<String>,
    /// Ids of catalog patterns applied by the recommendation.
    pub patterns: Vec<String>,
    /// When the decision cycle started.
    pub timestamp: String,
    pub execution_time_ms: Option<i64>,
    pub status: DecisionStatus,
    pub philosophy_alignment: Vec<String>,
    /// Producing component, e.g. `"synthesis-engine"`.
    pub source: String,
    pub tenant_id: Option<String>,
    pub metadata: serde_json::Value,
    pub trace_id: String,
    pub parent_decision_id: Option<String>,
    pub branch_strategy: Option<String>,
    pub deployment_plan: Option<String>,
    pub environment_handling: Option<String>,
    pub approval_required: Option<bool>,
    pub risk_assessment: Option<RiskLevel>,
    pub sync_status: SyncStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl DecisionRecord {
    /// Move the record to a new lifecycle status, stamping `updated_at`.
    ///
    /// Only `Processing -> Completed` and `Processing -> Failed` are legal;
    /// anything else returns `StorageError::IllegalTransition` and leaves
    /// the record untouched.
    pub fn transition(&mut self, to: DecisionStatus, now: &str) -> Result<(), StorageError> {
        let legal = self.status == DecisionStatus::Processing && to.is_terminal();
        if !legal {
            return Err(StorageError::IllegalTransition {
                id: self.id.clone(),
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        self.updated_at = now.to_string();
        Ok(())
    }
}

/// Timing and outcome instrumentation paired with a decision. Exactly one
/// trace exists per decision per top-level operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    pub trace_id: String,
    pub decision_id: String,
    /// Top-level operation name, e.g. `"process_scenario"`.
    pub operation: String,
    pub query_text: Option<String>,
    pub parameters: serde_json::Value,
    pub start_time: String,
    /// None while the trace is open.
    pub end_time: Option<String>,
    pub duration_ms: Option<i64>,
    /// None while the trace is open; set when the decision terminates.
    pub success: Option<bool>,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub branch_id: Option<String>,
    pub environment: Option<String>,
    pub created_at: String,
}

impl TraceRecord {
    pub fn is_open(&self) -> bool {
        self.success.is_none()
    }

    /// Close the trace with an outcome. Closing an already-closed trace is
    /// a caller bug surfaced as `IllegalTransition`.
    pub fn close(
        &mut self,
        success: bool,
        error_message: Option<String>,
        end_time: &str,
        duration_ms: i64,
    ) -> Result<(), StorageError> {
        if !self.is_open() {
            return Err(StorageError::IllegalTransition {
                id: self.trace_id.clone(),
                from: "closed".to_string(),
                to: if success { "success" } else { "failure" }.to_string(),
            });
        }
        self.success = Some(success);
        self.error_message = error_message;
        self.end_time = Some(end_time.to_string());
        self.duration_ms = Some(duration_ms);
        Ok(())
    }
}

/// One slot of the append-only history. `seq` is assigned by the store under
/// a single writer and is strictly monotonic: insertion order is completion
/// order, even when decisions complete concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub seq: u64,
    pub decision: DecisionRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: DecisionStatus) -> DecisionRecord {
        DecisionRecord {
            id: "dec-1".to_string(),
            context: "ctx".to_string(),
            question: "q".to_string(),
            recommendation: None,
            reasoning: None,
            confidence: None,
            insights: Vec::new(),
            patterns: Vec::new(),
            timestamp: "2026-08-31T00:00:00Z".to_string(),
            execution_time_ms: None,
            status,
            philosophy_alignment: Vec::new(),
            source: "synthesis-engine".to_string(),
            tenant_id: None,
            metadata: serde_json::Value::Null,
            trace_id: "trc-1".to_string(),
            parent_decision_id: None,
            branch_strategy: None,
            deployment_plan: None,
            environment_handling: None,
            approval_required: None,
            risk_assessment: None,
            sync_status: SyncStatus::Pending,
            created_at: "2026-08-31T00:00:00Z".to_string(),
            updated_at: "2026-08-31T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn processing_to_completed_is_legal() {
        let mut r = record(DecisionStatus::Processing);
        r.transition(DecisionStatus::Completed, "2026-08-31T00:00:01Z")
            .unwrap();
        assert_eq!(r.status, DecisionStatus::Completed);
        assert_eq!(r.updated_at, "2026-08-31T00:00:01Z");
    }

    #[test]
    fn processing_to_failed_is_legal() {
        let mut r = record(DecisionStatus::Processing);
        r.transition(DecisionStatus::Failed, "2026-08-31T00:00:01Z")
            .unwrap();
        assert_eq!(r.status, DecisionStatus::Failed);
    }

    #[test]
    fn completed_never_reverts_to_processing() {
        let mut r = record(DecisionStatus::Completed);
        let err = r
            .transition(DecisionStatus::Processing, "2026-08-31T00:00:01Z")
            .unwrap_err();
        assert!(matches!(err, StorageError::IllegalTransition { .. }));
        assert_eq!(r.status, DecisionStatus::Completed);
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        let mut r = record(DecisionStatus::Failed);
        assert!(r
            .transition(DecisionStatus::Completed, "2026-08-31T00:00:01Z")
            .is_err());
    }

    #[test]
    fn processing_to_processing_is_illegal() {
        let mut r = record(DecisionStatus::Processing);
        assert!(r
            .transition(DecisionStatus::Processing, "2026-08-31T00:00:01Z")
            .is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DecisionStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&SyncStatus::Conflict).unwrap(),
            "\"conflict\""
        );
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"high\"");
    }

    #[test]
    fn trace_close_is_once_only() {
        let mut t = TraceRecord {
            trace_id: "trc-1".to_string(),
            decision_id: "dec-1".to_string(),
            operation: "process_scenario".to_string(),
            query_text: None,
            parameters: serde_json::Value::Null,
            start_time: "2026-08-31T00:00:00Z".to_string(),
            end_time: None,
            duration_ms: None,
            success: None,
            error_message: None,
            metadata: serde_json::Value::Null,
            branch_id: None,
            environment: None,
            created_at: "2026-08-31T00:00:00Z".to_string(),
        };
        assert!(t.is_open());
        t.close(true, None, "2026-08-31T00:00:01Z", 1000).unwrap();
        assert!(!t.is_open());
        assert_eq!(t.duration_ms, Some(1000));
        assert!(t.close(false, None, "2026-08-31T00:00:02Z", 2000).is_err());
    }
}
