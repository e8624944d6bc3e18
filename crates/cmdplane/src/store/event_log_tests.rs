// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn insert_rejects_duplicate_delivery() {
    let log = InMemoryEventLog::new();
    log.insert("github", "pull_request", "d1", true, b"{}".to_vec()).await.unwrap();
    let second = log.insert("github", "pull_request", "d1", true, b"{}".to_vec()).await;
    assert!(matches!(second, Err(f) if f.kind == crate::error::PlaneError::Conflict));
}

#[tokio::test]
async fn different_delivery_ids_both_succeed() {
    let log = InMemoryEventLog::new();
    log.insert("github", "pull_request", "d1", true, b"{}".to_vec()).await.unwrap();
    log.insert("github", "pull_request", "d2", true, b"{}".to_vec()).await.unwrap();
    assert_eq!(log.list(EventFilter::default()).await.len(), 2);
}

#[tokio::test]
async fn mark_processed_only_touches_processed_fields() {
    let log = InMemoryEventLog::new();
    let event = log.insert("github", "pull_request", "d1", true, b"{}".to_vec()).await.unwrap();
    log.mark_processed(event.id, false, Some("boom".to_owned())).await;

    let reloaded = log.get(event.id).await.unwrap();
    assert_eq!(reloaded.processed_ok, Some(false));
    assert_eq!(reloaded.processing_error.as_deref(), Some("boom"));
    assert!(reloaded.processed_at.is_some());
    assert_eq!(reloaded.delivery_id, "d1");
    assert_eq!(reloaded.payload, b"{}".to_vec());
}

#[tokio::test]
async fn list_filters_by_processed_ok() {
    let log = InMemoryEventLog::new();
    let a = log.insert("github", "pull_request", "a", true, b"{}".to_vec()).await.unwrap();
    log.insert("github", "pull_request", "b", true, b"{}".to_vec()).await.unwrap();
    log.mark_processed(a.id, true, None).await;

    let unprocessed =
        log.list(EventFilter { source: None, processed_ok: Some(None) }).await;
    assert_eq!(unprocessed.len(), 1);
    assert_eq!(unprocessed[0].delivery_id, "b");
}
