// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::*;
use crate::store::kv::InMemoryKv;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Sample {
    text: String,
}

#[tokio::test]
async fn put_then_get_roundtrips_same_user_and_key() {
    let store = IdempotencyStore::new(InMemoryKv::new(), Duration::from_secs(60));
    let response = Sample { text: "merged".to_owned() };
    store.put("u1", "k1", &response).await;
    let replayed: Sample = store.get("u1", "k1").await.unwrap();
    assert_eq!(replayed, response);
}

#[tokio::test]
async fn different_user_does_not_collide() {
    let store = IdempotencyStore::new(InMemoryKv::new(), Duration::from_secs(60));
    store.put("u1", "k1", &Sample { text: "a".to_owned() }).await;
    let other: Option<Sample> = store.get("u2", "k1").await;
    assert!(other.is_none());
}

#[tokio::test]
async fn expires_after_window() {
    let store = IdempotencyStore::new(InMemoryKv::new(), Duration::from_millis(5));
    store.put("u1", "k1", &Sample { text: "a".to_owned() }).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let replayed: Option<Sample> = store.get("u1", "k1").await;
    assert!(replayed.is_none());
}
