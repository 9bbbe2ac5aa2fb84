use std::future::Future;

use super::{make_completed_decision, make_decision, make_trace, TestResult};
use crate::{DecisionStore, StorageError};

pub(super) async fn run_append_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "append",
        "seq_is_strictly_monotonic",
        seq_is_strictly_monotonic(factory).await,
    ));
    results.push(TestResult::from_result(
        "append",
        "history_order_matches_append_order",
        history_order_matches_append_order(factory).await,
    ));
    results.push(TestResult::from_result(
        "append",
        "duplicate_decision_id_rejected",
        duplicate_decision_id_rejected(factory).await,
    ));
    results.push(TestResult::from_result(
        "append",
        "duplicate_trace_id_rejected",
        duplicate_trace_id_rejected(factory).await,
    ));
    results.push(TestResult::from_result(
        "append",
        "failed_append_is_retryable",
        failed_append_is_retryable(factory).await,
    ));
    results.push(TestResult::from_result(
        "append",
        "trace_count_tracks_appends",
        trace_count_tracks_appends(factory).await,
    ));

    results
}

async fn seq_is_strictly_monotonic<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let mut last = None;
    for i in 0..5 {
        let seq = store
            .append_decision(make_completed_decision(&format!("dec-{i}")))
            .await
            .map_err(|e| e.to_string())?;
        if let Some(prev) = last {
            if seq <= prev {
                return Err(format!("seq {seq} not greater than previous {prev}"));
            }
        }
        last = Some(seq);
    }
    Ok(())
}

async fn history_order_matches_append_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let ids = ["dec-c", "dec-a", "dec-b"];
    for id in ids {
        store
            .append_decision(make_completed_decision(id))
            .await
            .map_err(|e| e.to_string())?;
    }
    let history = store.history().await.map_err(|e| e.to_string())?;
    let got: Vec<&str> = history.iter().map(|e| e.decision.id.as_str()).collect();
    if got != ids {
        return Err(format!("history order {got:?} != append order {ids:?}"));
    }
    for pair in history.windows(2) {
        if pair[1].seq <= pair[0].seq {
            return Err("history seq not increasing".to_string());
        }
    }
    Ok(())
}

async fn duplicate_decision_id_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .append_decision(make_decision("dec-1"))
        .await
        .map_err(|e| e.to_string())?;
    match store.append_decision(make_decision("dec-1")).await {
        Err(StorageError::DuplicateRecord { .. }) => Ok(()),
        Err(other) => Err(format!("expected DuplicateRecord, got {other}")),
        Ok(_) => Err("duplicate decision id accepted".to_string()),
    }
}

async fn duplicate_trace_id_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .append_trace(make_trace("trc-1", "dec-1"))
        .await
        .map_err(|e| e.to_string())?;
    match store.append_trace(make_trace("trc-1", "dec-1")).await {
        Err(StorageError::DuplicateRecord { .. }) => Ok(()),
        Err(other) => Err(format!("expected DuplicateRecord, got {other}")),
        Ok(()) => Err("duplicate trace id accepted".to_string()),
    }
}

/// A rejected append must leave the store unchanged, so the caller can
/// retain the record and retry (the at-least-once obligation).
async fn failed_append_is_retryable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .append_decision(make_decision("dec-1"))
        .await
        .map_err(|e| e.to_string())?;
    let _ = store.append_decision(make_decision("dec-1")).await;
    let retried = store.append_decision(make_decision("dec-2")).await;
    if retried.is_err() {
        return Err("append after rejection failed".to_string());
    }
    let history = store.history().await.map_err(|e| e.to_string())?;
    if history.len() != 2 {
        return Err(format!("expected 2 entries after retry, got {}", history.len()));
    }
    Ok(())
}

async fn trace_count_tracks_appends<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    for i in 0..3 {
        store
            .append_trace(make_trace(&format!("trc-{i}"), "dec-1"))
            .await
            .map_err(|e| e.to_string())?;
    }
    let count = store.trace_count().await.map_err(|e| e.to_string())?;
    if count != 3 {
        return Err(format!("expected 3 traces, got {count}"));
    }
    Ok(())
}
