use std::future::Future;

use super::{make_completed_decision, make_decision, make_trace, TestResult};
use crate::record::{DecisionStatus, SyncStatus};
use crate::{DecisionFilter, DecisionStore, StorageError};

pub(super) async fn run_query_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "query",
        "get_decision_returns_appended_record",
        get_decision_returns_appended_record(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "get_decision_miss_is_not_found",
        get_decision_miss_is_not_found(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "status_filter_selects_matching",
        status_filter_selects_matching(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "sync_status_and_tenant_filters_conjoin",
        sync_status_and_tenant_filters_conjoin(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "limit_truncates_in_history_order",
        limit_truncates_in_history_order(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "traces_scoped_by_decision_id",
        traces_scoped_by_decision_id(factory).await,
    ));

    results
}

async fn get_decision_returns_appended_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .append_decision(make_completed_decision("dec-1"))
        .await
        .map_err(|e| e.to_string())?;
    let got = store.get_decision("dec-1").await.map_err(|e| e.to_string())?;
    if got.id != "dec-1" || got.status != DecisionStatus::Completed {
        return Err(format!("unexpected record: {} {}", got.id, got.status));
    }
    Ok(())
}

async fn get_decision_miss_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    match store.get_decision("missing").await {
        Err(StorageError::DecisionNotFound { id }) if id == "missing" => Ok(()),
        Err(other) => Err(format!("expected DecisionNotFound, got {other}")),
        Ok(_) => Err("lookup of missing id succeeded".to_string()),
    }
}

async fn status_filter_selects_matching<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .append_decision(make_decision("dec-open"))
        .await
        .map_err(|e| e.to_string())?;
    store
        .append_decision(make_completed_decision("dec-done"))
        .await
        .map_err(|e| e.to_string())?;

    let completed = store
        .query_decisions(DecisionFilter {
            status: Some(DecisionStatus::Completed),
            ..Default::default()
        })
        .await
        .map_err(|e| e.to_string())?;
    if completed.len() != 1 || completed[0].id != "dec-done" {
        return Err(format!("status filter returned {} records", completed.len()));
    }
    Ok(())
}

async fn sync_status_and_tenant_filters_conjoin<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let mut a = make_completed_decision("dec-a");
    a.tenant_id = Some("acme".to_string());
    a.sync_status = SyncStatus::Conflict;
    let mut b = make_completed_decision("dec-b");
    b.tenant_id = Some("acme".to_string());
    let mut c = make_completed_decision("dec-c");
    c.tenant_id = Some("globex".to_string());
    c.sync_status = SyncStatus::Conflict;
    for d in [a, b, c] {
        store.append_decision(d).await.map_err(|e| e.to_string())?;
    }

    let hits = store
        .query_decisions(DecisionFilter {
            sync_status: Some(SyncStatus::Conflict),
            tenant_id: Some("acme".to_string()),
            ..Default::default()
        })
        .await
        .map_err(|e| e.to_string())?;
    if hits.len() != 1 || hits[0].id != "dec-a" {
        return Err(format!("conjoined filter returned {:?}", hits.len()));
    }
    Ok(())
}

async fn limit_truncates_in_history_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DecisionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    for i in 0..5 {
        store
            .append_decision(make_completed_decision(&format!("dec-{i}")))
            .await
            .map_err(|e| e.to_string())?;
    }
    let hits = store
        .query_decisions(DecisionFilter {
            limit: 2,
            ..Default::default()
        })
        .await
        .map_err(|e| e.to_string())?;
    let got: Vec<&str> = hits.iter().map(|d| d.id.as_str()).collect();
    if got != ["dec-0", "dec-1"] {
        return Err(format!("limit returned {got:?}"));
    }
    Ok(())
}

async fn traces_scoped_by_decision_id<S, F, Fut>(factory: &F) -> Result<(), String>
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
    store
        .append_trace(make_trace("trc-2", "dec-2"))
        .await
        .map_err(|e| e.to_string())?;

    let scoped = store
        .query_traces(Some("dec-1"))
        .await
        .map_err(|e| e.to_string())?;
    if scoped.len() != 1 || scoped[0].trace_id != "trc-1" {
        return Err(format!("scoped query returned {} traces", scoped.len()));
    }
    let all = store.query_traces(None).await.map_err(|e| e.to_string())?;
    if all.len() != 2 {
        return Err(format!("unscoped query returned {} traces", all.len()));
    }
    Ok(())
}
