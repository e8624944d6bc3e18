// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

#[tokio::test]
async fn put_then_get_roundtrips() {
    let kv = InMemoryKv::new();
    kv.put("k", b"v".to_vec(), Duration::from_secs(10)).await;
    assert_eq!(kv.get("k").await, Some(b"v".to_vec()));
}

#[tokio::test]
async fn get_returns_none_after_expiry() {
    let kv = InMemoryKv::new();
    kv.put("k", b"v".to_vec(), Duration::from_millis(0)).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(kv.get("k").await, None);
}

#[tokio::test]
async fn consume_if_present_is_exactly_once() {
    let kv = InMemoryKv::new();
    kv.put("tok", b"payload".to_vec(), Duration::from_secs(10)).await;

    let mut successes = 0;
    let mut handles = Vec::new();
    for _ in 0..10 {
        let kv = Arc::clone(&kv);
        handles.push(tokio::spawn(async move { kv.consume_if_present("tok").await }));
    }
    for h in handles {
        if h.await.unwrap().is_some() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(kv.get("tok").await, None);
}

#[tokio::test]
async fn consume_if_present_respects_expiry() {
    let kv = InMemoryKv::new();
    kv.put("tok", b"payload".to_vec(), Duration::from_millis(0)).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(kv.consume_if_present("tok").await, None);
}

#[tokio::test]
async fn touch_extends_ttl() {
    let kv = InMemoryKv::new();
    kv.put("k", b"v".to_vec(), Duration::from_millis(20)).await;
    kv.touch("k", Duration::from_secs(10)).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(kv.get("k").await, Some(b"v".to_vec()));
}

#[tokio::test]
async fn delete_removes_unconditionally() {
    let kv = InMemoryKv::new();
    kv.put("k", b"v".to_vec(), Duration::from_secs(10)).await;
    kv.delete("k").await;
    assert_eq!(kv.get("k").await, None);
}

#[tokio::test]
async fn sweeper_removes_expired_entries() {
    let kv = InMemoryKv::new();
    let shutdown = CancellationToken::new();
    kv.spawn_sweeper(Duration::from_millis(10), shutdown.clone());
    kv.put("k", b"v".to_vec(), Duration::from_millis(5)).await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    // The public read path already treats it as gone; the sweeper just
    // reclaims the backing memory. Assert via get() which is all callers see.
    assert_eq!(kv.get("k").await, None);
    shutdown.cancel();
}
