use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{DecisionRecord, DecisionStatus, HistoryEntry, SyncStatus, TraceRecord};

/// Filters for decision queries. All fields are conjunctive; `limit = 0`
/// means no limit.
#[derive(Debug, Clone, Default)]
pub struct DecisionFilter {
    pub status: Option<DecisionStatus>,
    pub sync_status: Option<SyncStatus>,
    pub tenant_id: Option<String>,
    pub limit: usize,
}

/// The storage trait for Accord persistence backends.
///
/// A `DecisionStore` holds the append-only decision history and its paired
/// traces. The engine's recorder is the only writer during normal operation;
/// reporting and reconciliation layers are readers.
///
/// ## Append semantics
///
/// `append_decision` assigns the history sequence number under a single
/// writer: the returned `seq` values are strictly monotonic in append order,
/// and the order of `history()` equals that append order forever. Entries
/// are never deleted, reordered, or overwritten. Appending a decision or
/// trace whose id already exists returns `StorageError::DuplicateRecord`.
///
/// ## At-least-once obligation
///
/// The caller retains records in memory until an append returns `Ok`; a
/// failed append must therefore be safe to retry with the same record.
///
/// ## Thread safety
///
/// Implementations must be `Send + Sync + 'static` so the recorder can be
/// shared across async task boundaries.
#[async_trait]
pub trait DecisionStore: Send + Sync + 'static {
    /// Append a decision to the history. Returns the assigned sequence
    /// number, strictly greater than every previously returned one.
    async fn append_decision(&self, record: DecisionRecord) -> Result<u64, StorageError>;

    /// Append a trace record.
    async fn append_trace(&self, record: TraceRecord) -> Result<(), StorageError>;

    /// Fetch one decision by id.
    ///
    /// Returns `Err(StorageError::DecisionNotFound)` if absent.
    async fn get_decision(&self, id: &str) -> Result<DecisionRecord, StorageError>;

    /// Decisions matching the filter, in history (append) order.
    async fn query_decisions(
        &self,
        filter: DecisionFilter,
    ) -> Result<Vec<DecisionRecord>, StorageError>;

    /// Traces, optionally restricted to one decision, in append order.
    async fn query_traces(
        &self,
        decision_id: Option<&str>,
    ) -> Result<Vec<TraceRecord>, StorageError>;

    /// The full history in append order, with sequence numbers.
    async fn history(&self) -> Result<Vec<HistoryEntry>, StorageError>;

    /// Total number of traces appended.
    async fn trace_count(&self) -> Result<usize, StorageError>;
}
