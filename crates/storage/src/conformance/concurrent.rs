use std::future::Future;
use std::sync::Arc;

use super::{make_completed_decision, make_trace, TestResult};
use crate::DecisionStore;

/// Number of concurrent tasks to spawn in each test.
const N: usize = 16;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_appends_lose_nothing",
        concurrent_appends_lose_nothing(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_seqs_are_unique_and_ordered",
        concurrent_seqs_are_unique_and_ordered(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_trace_appends_all_recorded",
        concurrent_trace_appends_all_recorded(factory).await,
    ));

    results
}

/// N tasks append distinct decisions in parallel. Every append must land in
/// the history exactly once -- appends are never dropped under contention.
async fn concurrent_appends_lose_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);
    let mut handles = Vec::new();
    for i in 0..N {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .append_decision(make_completed_decision(&format!("dec-{i}")))
                .await
        }));
    }
    for h in handles {
        h.await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| e.to_string())?;
    }
    let history = store.history().await.map_err(|e| e.to_string())?;
    if history.len() != N {
        return Err(format!("expected {N} entries, got {}", history.len()));
    }
    Ok(())
}

/// The seq values handed back to concurrent appenders must be unique, and
/// sorting the history by seq must not change its order: the order observed
/// by readers is the serialization order the store chose.
async fn concurrent_seqs_are_unique_and_ordered<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);
    let mut handles = Vec::new();
    for i in 0..N {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .append_decision(make_completed_decision(&format!("dec-{i}")))
                .await
        }));
    }
    let mut seqs = Vec::new();
    for h in handles {
        seqs.push(
            h.await
                .map_err(|e| format!("task panicked: {e}"))?
                .map_err(|e| e.to_string())?,
        );
    }
    seqs.sort_unstable();
    seqs.dedup();
    if seqs.len() != N {
        return Err("duplicate seq assigned under contention".to_string());
    }

    let history = store.history().await.map_err(|e| e.to_string())?;
    for pair in history.windows(2) {
        if pair[1].seq <= pair[0].seq {
            return Err("history not ordered by seq".to_string());
        }
    }
    Ok(())
}

async fn concurrent_trace_appends_all_recorded<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);
    let mut handles = Vec::new();
    for i in 0..N {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .append_trace(make_trace(&format!("trc-{i}"), &format!("dec-{i}")))
                .await
        }));
    }
    for h in handles {
        h.await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| e.to_string())?;
    }
    let count = store.trace_count().await.map_err(|e| e.to_string())?;
    if count != N {
        return Err(format!("expected {N} traces, got {count}"));
    }
    Ok(())
}
