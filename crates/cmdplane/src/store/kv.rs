// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed, TTL-aware key-value store with an atomic consume-if-present
//! primitive. The pending-action manager, session context, and
//! idempotency layer are all built on top of this trait.
//!
//! Two implementations ship: [`InMemoryKv`] (mutex-guarded map with a
//! background sweeper) is the only one needed for a single-process
//! deployment and for tests; a network-backed implementation would
//! implement the same trait against a store with native TTL (e.g. Redis)
//! and degrade to [`InMemoryKv`] on `ErrTransient`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::state::epoch_ms;

/// Backend unavailability — callers degrade to the in-process variant.
#[derive(Debug, Clone)]
pub struct KvTransientError(pub String);

impl std::fmt::Display for KvTransientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "kv backend transient error: {}", self.0)
    }
}

impl std::error::Error for KvTransientError {}

struct Entry {
    value: Vec<u8>,
    expires_at_ms: u64,
}

/// Capability set every KV backend must present identically.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// Insert or overwrite `key` with `value`, expiring at `now + ttl`.
    async fn put(&self, key: &str, value: Vec<u8>, ttl: std::time::Duration);

    /// Read `key` if present and not expired.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Atomically read and remove `key`. Returns `(value, existed)`: at most
    /// one concurrent caller observes `existed == true` for a given key.
    async fn consume_if_present(&self, key: &str) -> Option<Vec<u8>>;

    /// Remove `key` unconditionally.
    async fn delete(&self, key: &str);

    /// Refresh `key`'s TTL without altering its value. No-op if absent.
    async fn touch(&self, key: &str, ttl: std::time::Duration);
}

/// In-process map guarded by a mutex, with a background sweeper removing
/// expired entries. Losing its contents on restart is acceptable — callers
/// (pending actions, session context) degrade to "must re-issue".
pub struct InMemoryKv {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryKv {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { entries: Mutex::new(HashMap::new()) })
    }

    /// Spawn a background loop that sweeps expired entries on an interval,
    /// stopping when `shutdown` is cancelled. Mirrors the teacher's
    /// `upstream::health::spawn_health_checker` shape: a `tokio::select!`
    /// between the shutdown token and an interval tick.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: std::time::Duration, shutdown: CancellationToken) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = timer.tick() => {}
                }
                let now = epoch_ms();
                let mut entries = this.entries.lock().await;
                let before = entries.len();
                entries.retain(|_, e| e.expires_at_ms > now);
                let removed = before - entries.len();
                if removed > 0 {
                    tracing::debug!(removed, "kv sweeper removed expired entries");
                }
            }
        });
    }
}

impl Default for InMemoryKv {
    fn default() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

#[async_trait::async_trait]
impl KvStore for InMemoryKv {
    async fn put(&self, key: &str, value: Vec<u8>, ttl: std::time::Duration) {
        let expires_at_ms = epoch_ms() + ttl.as_millis() as u64;
        self.entries.lock().await.insert(key.to_owned(), Entry { value, expires_at_ms });
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = epoch_ms();
        let entries = self.entries.lock().await;
        entries.get(key).filter(|e| e.expires_at_ms > now).map(|e| e.value.clone())
    }

    async fn consume_if_present(&self, key: &str) -> Option<Vec<u8>> {
        let now = epoch_ms();
        let mut entries = self.entries.lock().await;
        match entries.remove(key) {
            Some(e) if e.expires_at_ms > now => Some(e.value),
            _ => None,
        }
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    async fn touch(&self, key: &str, ttl: std::time::Duration) {
        let mut entries = self.entries.lock().await;
        if let Some(e) = entries.get_mut(key) {
            e.expires_at_ms = epoch_ms() + ttl.as_millis() as u64;
        }
    }
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod kv_tests;
