//! Decision recorder: wraps one scenario-processing cycle into an immutable
//! decision + trace pair and appends both to the history.
//!
//! Lifecycle discipline:
//!
//! 1. `begin` creates the decision in `Processing` with an open trace and a
//!    fresh collision-resistant id pair. Nothing is appended yet.
//! 2. `complete` or `fail` consumes the `OpenDecision`, so a second terminal
//!    transition is impossible by construction, and appends both records.
//! 3. Dropping an `OpenDecision` without completing leaves the decision in
//!    `Processing` -- the externally-recoverable cancellation case. Moving
//!    to `Failed` always requires an explicit reason via `fail`.
//!
//! Appends are at-least-once: when the store rejects an append, the records
//! are retained in a pending buffer and `flush_pending` retries them. A
//! record is never discarded on a failed append.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use accord_core::Scenario;
use accord_storage::{
    DecisionRecord, DecisionStatus, DecisionStore, StorageError, SyncStatus, TraceRecord,
};

use crate::error::EngineError;
use crate::synthesize::Recommendation;

/// Static identity stamped onto every record this recorder produces.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub source: String,
    pub tenant_id: Option<String>,
    pub environment: Option<String>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        RecorderConfig {
            source: "synthesis-engine".to_string(),
            tenant_id: None,
            environment: None,
        }
    }
}

/// An in-flight decision cycle. Consumed exactly once by `complete` or
/// `fail`; holding it is holding the sole right to terminate the decision.
#[derive(Debug)]
pub struct OpenDecision {
    decision: DecisionRecord,
    trace: TraceRecord,
    started: Instant,
}

impl OpenDecision {
    pub fn decision_id(&self) -> &str {
        &self.decision.id
    }

    pub fn trace_id(&self) -> &str {
        &self.trace.trace_id
    }
}

/// What happened to a terminal decision's append.
///
/// `store_error` is populated when the storage collaborator rejected an
/// append; the affected records stay in the recorder's pending buffer and
/// the returned copies remain authoritative in memory.
#[derive(Debug)]
pub struct AppendReceipt {
    pub decision: DecisionRecord,
    pub trace: TraceRecord,
    /// History sequence assigned by the store, when the append landed.
    pub seq: Option<u64>,
    pub store_error: Option<StorageError>,
}

#[derive(Debug)]
enum Pending {
    Decision(DecisionRecord),
    Trace(TraceRecord),
}

/// Records decision cycles against an injected `DecisionStore`.
pub struct DecisionRecorder<S: DecisionStore> {
    store: Arc<S>,
    config: RecorderConfig,
    pending: Mutex<Vec<Pending>>,
}

impl<S: DecisionStore> DecisionRecorder<S> {
    pub fn new(store: Arc<S>, config: RecorderConfig) -> Self {
        DecisionRecorder {
            store,
            config,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Open a new decision cycle for a scenario: decision in `Processing`,
    /// trace open, clocks started.
    pub fn begin(&self, scenario: &Scenario) -> OpenDecision {
        let now = now_rfc3339();
        let decision_id = new_id("dec");
        let trace_id = new_id("trc");

        let decision = DecisionRecord {
            id: decision_id.clone(),
            context: scenario.context.clone(),
            question: scenario.requirement.clone(),
            recommendation: None,
            reasoning: None,
            confidence: None,
            insights: Vec::new(),
            patterns: Vec::new(),
            timestamp: now.clone(),
            execution_time_ms: None,
            status: DecisionStatus::Processing,
            philosophy_alignment: Vec::new(),
            source: self.config.source.clone(),
            tenant_id: self.config.tenant_id.clone(),
            metadata: serde_json::json!({
                "scenario": scenario.name,
                "kind": scenario.kind.as_str(),
            }),
            trace_id: trace_id.clone(),
            parent_decision_id: None,
            branch_strategy: None,
            deployment_plan: None,
            environment_handling: None,
            approval_required: None,
            risk_assessment: None,
            sync_status: SyncStatus::Pending,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let trace = TraceRecord {
            trace_id,
            decision_id,
            operation: "process_scenario".to_string(),
            query_text: Some(scenario.requirement.clone()),
            parameters: serde_json::json!({
                "scenario": scenario.name,
                "kind": scenario.kind.as_str(),
                "credential_count": scenario.credentials.len(),
                "obligation_count": scenario.obligation_count(),
            }),
            start_time: now.clone(),
            end_time: None,
            duration_ms: None,
            success: None,
            error_message: None,
            metadata: serde_json::Value::Null,
            branch_id: None,
            environment: self.config.environment.clone(),
            created_at: now,
        };

        OpenDecision {
            decision,
            trace,
            started: Instant::now(),
        }
    }

    /// Terminate a cycle successfully: fill the recommendation fields, move
    /// to `Completed`, close the trace, and append both records.
    pub async fn complete(
        &self,
        mut open: OpenDecision,
        recommendation: &Recommendation,
    ) -> AppendReceipt {
        let now = now_rfc3339();
        let elapsed_ms = open.started.elapsed().as_millis() as i64;

        let d = &mut open.decision;
        d.recommendation = Some(recommendation.text.clone());
        d.reasoning = Some(recommendation.reasoning.clone());
        d.confidence = Some(recommendation.confidence);
        d.insights = recommendation.insights.clone();
        d.patterns = recommendation.patterns_applied.iter().cloned().collect();
        d.philosophy_alignment = recommendation.philosophy_alignment.clone();
        d.branch_strategy = Some(recommendation.branch_strategy.clone());
        d.deployment_plan = Some(recommendation.deployment_plan.clone());
        d.environment_handling = Some(recommendation.environment_handling.clone());
        d.approval_required = Some(recommendation.approval_required);
        d.risk_assessment = Some(recommendation.risk_level);
        d.execution_time_ms = Some(elapsed_ms);

        // Both records are open by construction; a guard failure here is a
        // recorder bug and is surfaced instead of panicking.
        if let Err(err) = d.transition(DecisionStatus::Completed, &now) {
            return self.reject(open, err);
        }
        if let Err(err) = open.trace.close(true, None, &now, elapsed_ms) {
            return self.reject(open, err);
        }

        self.append(open.decision, open.trace).await
    }

    /// Terminate a cycle with a structural failure: move to `Failed`, close
    /// the trace unsuccessfully with the taxonomy kind and reason, and
    /// append both records.
    pub async fn fail(&self, mut open: OpenDecision, error: &EngineError) -> AppendReceipt {
        let now = now_rfc3339();
        let elapsed_ms = open.started.elapsed().as_millis() as i64;
        let message = format!("{}: {}", error.taxonomy(), error);

        open.decision.execution_time_ms = Some(elapsed_ms);
        if let Err(err) = open.decision.transition(DecisionStatus::Failed, &now) {
            return self.reject(open, err);
        }
        if let Err(err) = open
            .trace
            .close(false, Some(message), &now, elapsed_ms)
        {
            return self.reject(open, err);
        }

        self.append(open.decision, open.trace).await
    }

    /// Number of records awaiting a retry append.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().expect("pending buffer poisoned").len()
    }

    /// Retry every retained record. Returns how many were acknowledged.
    ///
    /// A `DuplicateRecord` rejection counts as acknowledged: it means an
    /// earlier attempt landed and only the acknowledgment was lost.
    pub async fn flush_pending(&self) -> Result<usize, EngineError> {
        let drained: Vec<Pending> = {
            let mut pending = self.pending.lock().expect("pending buffer poisoned");
            std::mem::take(&mut *pending)
        };

        let mut flushed = 0;
        let mut first_error = None;
        for item in drained {
            let outcome = match &item {
                Pending::Decision(record) => {
                    self.store.append_decision(record.clone()).await.map(|_| ())
                }
                Pending::Trace(record) => self.store.append_trace(record.clone()).await,
            };
            match outcome {
                Ok(()) | Err(StorageError::DuplicateRecord { .. }) => flushed += 1,
                Err(err) => {
                    self.pending
                        .lock()
                        .expect("pending buffer poisoned")
                        .push(item);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(EngineError::Persistence(err)),
            None => Ok(flushed),
        }
    }

    async fn append(&self, decision: DecisionRecord, trace: TraceRecord) -> AppendReceipt {
        let seq = match self.store.append_decision(decision.clone()).await {
            Ok(seq) => Some(seq),
            Err(err) => {
                let mut pending = self.pending.lock().expect("pending buffer poisoned");
                pending.push(Pending::Decision(decision.clone()));
                pending.push(Pending::Trace(trace.clone()));
                return AppendReceipt {
                    decision,
                    trace,
                    seq: None,
                    store_error: Some(err),
                };
            }
        };

        match self.store.append_trace(trace.clone()).await {
            Ok(()) => AppendReceipt {
                decision,
                trace,
                seq,
                store_error: None,
            },
            Err(err) => {
                self.pending
                    .lock()
                    .expect("pending buffer poisoned")
                    .push(Pending::Trace(trace.clone()));
                AppendReceipt {
                    decision,
                    trace,
                    seq,
                    store_error: Some(err),
                }
            }
        }
    }

    fn reject(&self, open: OpenDecision, err: StorageError) -> AppendReceipt {
        AppendReceipt {
            decision: open.decision,
            trace: open.trace,
            seq: None,
            store_error: Some(err),
        }
    }
}

/// Current UTC time as an RFC 3339 string.
pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Collision-resistant id: unix milliseconds plus a random hex suffix.
/// Unique within process lifetime, which is all the recorder requires.
fn new_id(prefix: &str) -> String {
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix = rand::random::<u32>() & 0x00ff_ffff;
    format!("{prefix}-{millis}-{suffix:06x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_core::ScenarioKind;
    use accord_storage::{MemoryStore, RiskLevel};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn scenario() -> Scenario {
        Scenario {
            name: "Create service repo".to_string(),
            kind: ScenarioKind::from("repository-creation"),
            context: "platform team".to_string(),
            requirement: "new repository with CI".to_string(),
            credentials: BTreeMap::new(),
            constraints: Vec::new(),
            requirements: Vec::new(),
        }
    }

    fn recommendation() -> Recommendation {
        Recommendation {
            text: "Develop locally, deploy connected.".to_string(),
            reasoning: "two corroborating strategies".to_string(),
            confidence: 0.914,
            insights: vec!["insight".to_string()],
            patterns_applied: BTreeSet::from(["pat-1".to_string()]),
            philosophy_alignment: vec!["test before deploy".to_string()],
            branch_strategy: "local -> integration -> main".to_string(),
            deployment_plan: "preview then production".to_string(),
            environment_handling: "sandboxed locally".to_string(),
            approval_required: false,
            risk_level: RiskLevel::Medium,
        }
    }

    /// Store that rejects every append until `healed` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        healed: AtomicBool,
    }

    #[async_trait]
    impl DecisionStore for FlakyStore {
        async fn append_decision(&self, record: DecisionRecord) -> Result<u64, StorageError> {
            if !self.healed.load(Ordering::SeqCst) {
                return Err(StorageError::Backend("store offline".to_string()));
            }
            self.inner.append_decision(record).await
        }

        async fn append_trace(&self, record: TraceRecord) -> Result<(), StorageError> {
            if !self.healed.load(Ordering::SeqCst) {
                return Err(StorageError::Backend("store offline".to_string()));
            }
            self.inner.append_trace(record).await
        }

        async fn get_decision(&self, id: &str) -> Result<DecisionRecord, StorageError> {
            self.inner.get_decision(id).await
        }

        async fn query_decisions(
            &self,
            filter: accord_storage::DecisionFilter,
        ) -> Result<Vec<DecisionRecord>, StorageError> {
            self.inner.query_decisions(filter).await
        }

        async fn query_traces(
            &self,
            decision_id: Option<&str>,
        ) -> Result<Vec<TraceRecord>, StorageError> {
            self.inner.query_traces(decision_id).await
        }

        async fn history(&self) -> Result<Vec<accord_storage::HistoryEntry>, StorageError> {
            self.inner.history().await
        }

        async fn trace_count(&self) -> Result<usize, StorageError> {
            self.inner.trace_count().await
        }
    }

    #[test]
    fn begin_opens_processing_decision_with_open_trace() {
        let recorder =
            DecisionRecorder::new(Arc::new(MemoryStore::new()), RecorderConfig::default());
        let open = recorder.begin(&scenario());
        assert_eq!(open.decision.status, DecisionStatus::Processing);
        assert!(open.trace.is_open());
        assert_eq!(open.decision.trace_id, open.trace.trace_id);
        assert_eq!(open.trace.decision_id, open.decision.id);
        assert_eq!(open.decision.question, "new repository with CI");
    }

    #[test]
    fn ids_are_unique_across_cycles() {
        let recorder =
            DecisionRecorder::new(Arc::new(MemoryStore::new()), RecorderConfig::default());
        let a = recorder.begin(&scenario());
        let b = recorder.begin(&scenario());
        assert_ne!(a.decision_id(), b.decision_id());
        assert_ne!(a.trace_id(), b.trace_id());
    }

    #[tokio::test]
    async fn complete_fills_recommendation_and_appends() {
        let store = Arc::new(MemoryStore::new());
        let recorder = DecisionRecorder::new(Arc::clone(&store), RecorderConfig::default());
        let open = recorder.begin(&scenario());
        let receipt = recorder.complete(open, &recommendation()).await;

        assert!(receipt.store_error.is_none());
        assert_eq!(receipt.seq, Some(0));
        assert_eq!(receipt.decision.status, DecisionStatus::Completed);
        assert_eq!(receipt.decision.confidence, Some(0.914));
        assert_eq!(receipt.decision.patterns, vec!["pat-1".to_string()]);
        assert!(receipt.decision.execution_time_ms.is_some());
        assert_eq!(receipt.trace.success, Some(true));

        let stored = store.get_decision(&receipt.decision.id).await.unwrap();
        assert_eq!(stored.status, DecisionStatus::Completed);
        assert_eq!(store.trace_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn fail_closes_trace_with_taxonomy_reason() {
        let store = Arc::new(MemoryStore::new());
        let recorder = DecisionRecorder::new(Arc::clone(&store), RecorderConfig::default());
        let open = recorder.begin(&scenario());
        let error = EngineError::StrategyGeneration {
            kind: "time-travel".to_string(),
            message: "no template registered for scenario kind".to_string(),
        };
        let receipt = recorder.fail(open, &error).await;

        assert_eq!(receipt.decision.status, DecisionStatus::Failed);
        assert_eq!(receipt.decision.recommendation, None);
        assert_eq!(receipt.trace.success, Some(false));
        let message = receipt.trace.error_message.unwrap();
        assert!(message.starts_with("strategy-generation-failure:"));
        assert!(message.contains("time-travel"));
    }

    #[tokio::test]
    async fn history_order_is_completion_order() {
        let store = Arc::new(MemoryStore::new());
        let recorder = DecisionRecorder::new(Arc::clone(&store), RecorderConfig::default());
        let first_begun = recorder.begin(&scenario());
        let second_begun = recorder.begin(&scenario());

        // The cycle begun second completes first.
        let r2 = recorder.complete(second_begun, &recommendation()).await;
        let r1 = recorder.complete(first_begun, &recommendation()).await;

        let history = store.history().await.unwrap();
        assert_eq!(history[0].decision.id, r2.decision.id);
        assert_eq!(history[1].decision.id, r1.decision.id);
        assert!(history[0].seq < history[1].seq);
    }

    #[tokio::test]
    async fn failed_append_retains_records_and_flush_retries() {
        let store = Arc::new(FlakyStore::default());
        let recorder = DecisionRecorder::new(Arc::clone(&store), RecorderConfig::default());
        let open = recorder.begin(&scenario());
        let receipt = recorder.complete(open, &recommendation()).await;

        assert!(receipt.store_error.is_some());
        assert_eq!(receipt.seq, None);
        // The terminal record itself is intact despite the failed append.
        assert_eq!(receipt.decision.status, DecisionStatus::Completed);
        assert_eq!(recorder.pending_len(), 2);

        // Store still down: flush fails and keeps everything.
        assert!(recorder.flush_pending().await.is_err());
        assert_eq!(recorder.pending_len(), 2);

        store.healed.store(true, Ordering::SeqCst);
        let flushed = recorder.flush_pending().await.unwrap();
        assert_eq!(flushed, 2);
        assert_eq!(recorder.pending_len(), 0);
        assert_eq!(store.history().await.unwrap().len(), 1);
        assert_eq!(store.trace_count().await.unwrap(), 1);
    }

    #[test]
    fn dropping_an_open_decision_leaves_it_processing() {
        let recorder =
            DecisionRecorder::new(Arc::new(MemoryStore::new()), RecorderConfig::default());
        let open = recorder.begin(&scenario());
        let status = open.decision.status;
        drop(open);
        // Nothing was appended and no terminal state was reached.
        assert_eq!(status, DecisionStatus::Processing);
        assert_eq!(recorder.pending_len(), 0);
    }
}
