//! In-memory reference backend for `DecisionStore`.
//!
//! All state sits behind one mutex, which is also what serializes appends
//! and makes the sequence numbers monotonic: whichever append takes the lock
//! first gets the lower seq, and `history()` returns entries in exactly that
//! order. The lock is never held across an await point.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{DecisionRecord, HistoryEntry, TraceRecord};
use crate::traits::{DecisionFilter, DecisionStore};

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<HistoryEntry>,
    decision_index: BTreeMap<String, usize>,
    traces: Vec<TraceRecord>,
    trace_ids: BTreeMap<String, usize>,
    next_seq: u64,
}

/// Mutex-guarded in-memory store. Suitable for tests, single-process
/// deployments, and as the reference behavior for the conformance harness.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl DecisionStore for MemoryStore {
    async fn append_decision(&self, record: DecisionRecord) -> Result<u64, StorageError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        if inner.decision_index.contains_key(&record.id) {
            return Err(StorageError::DuplicateRecord {
                kind: "decision",
                id: record.id,
            });
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let idx = inner.entries.len();
        inner.decision_index.insert(record.id.clone(), idx);
        inner.entries.push(HistoryEntry {
            seq,
            decision: record,
        });
        Ok(seq)
    }

    async fn append_trace(&self, record: TraceRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        if inner.trace_ids.contains_key(&record.trace_id) {
            return Err(StorageError::DuplicateRecord {
                kind: "trace",
                id: record.trace_id,
            });
        }
        let idx = inner.traces.len();
        inner.trace_ids.insert(record.trace_id.clone(), idx);
        inner.traces.push(record);
        Ok(())
    }

    async fn get_decision(&self, id: &str) -> Result<DecisionRecord, StorageError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner
            .decision_index
            .get(id)
            .map(|&idx| inner.entries[idx].decision.clone())
            .ok_or_else(|| StorageError::DecisionNotFound { id: id.to_string() })
    }

    async fn query_decisions(
        &self,
        filter: DecisionFilter,
    ) -> Result<Vec<DecisionRecord>, StorageError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut out = Vec::new();
        for entry in &inner.entries {
            let d = &entry.decision;
            if let Some(status) = filter.status {
                if d.status != status {
                    continue;
                }
            }
            if let Some(sync) = filter.sync_status {
                if d.sync_status != sync {
                    continue;
                }
            }
            if let Some(tenant) = &filter.tenant_id {
                if d.tenant_id.as_ref() != Some(tenant) {
                    continue;
                }
            }
            out.push(d.clone());
            if filter.limit > 0 && out.len() == filter.limit {
                break;
            }
        }
        Ok(out)
    }

    async fn query_traces(
        &self,
        decision_id: Option<&str>,
    ) -> Result<Vec<TraceRecord>, StorageError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .traces
            .iter()
            .filter(|t| decision_id.map_or(true, |id| t.decision_id == id))
            .cloned()
            .collect())
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.entries.clone())
    }

    async fn trace_count(&self) -> Result<usize, StorageError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.traces.len())
    }
}
