// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;
use crate::store::kv::InMemoryKv;

#[tokio::test]
async fn get_returns_none_before_any_write() {
    let store = SessionStore::new(InMemoryKv::new(), Duration::from_secs(60));
    assert!(store.get("s1").await.is_none());
}

#[tokio::test]
async fn set_repo_pr_then_get_roundtrips() {
    let store = SessionStore::new(InMemoryKv::new(), Duration::from_secs(60));
    store.set_repo_pr("s1", "org/repo", 412).await;
    let ctx = store.get("s1").await.unwrap();
    assert_eq!(ctx.focus_repo.as_deref(), Some("org/repo"));
    assert_eq!(ctx.focus_pr, Some(412));
}

#[tokio::test]
async fn set_last_response_preserves_focus() {
    let store = SessionStore::new(InMemoryKv::new(), Duration::from_secs(60));
    store.set_repo_pr("s1", "org/repo", 412).await;
    store
        .set_last_response("s1", "PR 412 merged.", vec![Card {
            kind: "pr".to_owned(),
            title: "PR #412".to_owned(),
            subtitle: None,
            lines: vec![],
            deep_link: None,
        }])
        .await;
    let ctx = store.get("s1").await.unwrap();
    assert_eq!(ctx.focus_pr, Some(412));
    assert_eq!(ctx.last_response_spoken_text.as_deref(), Some("PR 412 merged."));
    assert_eq!(ctx.last_cards.len(), 1);
}

#[tokio::test]
async fn clear_removes_session() {
    let store = SessionStore::new(InMemoryKv::new(), Duration::from_secs(60));
    store.set_repo_pr("s1", "org/repo", 412).await;
    store.clear("s1").await;
    assert!(store.get("s1").await.is_none());
}

#[tokio::test]
async fn pending_action_token_roundtrips_and_clears() {
    let store = SessionStore::new(InMemoryKv::new(), Duration::from_secs(60));
    store.set_pending_action_token("s1", Some("tok123".to_owned())).await;
    assert_eq!(store.get("s1").await.unwrap().pending_action_token.as_deref(), Some("tok123"));
    store.set_pending_action_token("s1", None).await;
    assert_eq!(store.get("s1").await.unwrap().pending_action_token, None);
}

#[tokio::test]
async fn active_profile_roundtrips() {
    let store = SessionStore::new(InMemoryKv::new(), Duration::from_secs(60));
    store.set_active_profile("s1", "kitchen").await;
    assert_eq!(store.get("s1").await.unwrap().active_profile.as_deref(), Some("kitchen"));
}

#[tokio::test]
async fn read_extends_ttl() {
    let store = SessionStore::new(InMemoryKv::new(), Duration::from_millis(30));
    store.set_repo_pr("s1", "org/repo", 412).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.get("s1").await.is_some()); // touches TTL
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.get("s1").await.is_some()); // would have expired without the touch
}
