// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotency layer: `idem:<user>:<key> -> response`,
//! built on the KV. Two `POST /v1/command` calls with the same
//! `(user_id, idempotency_key)` within the window return byte-identical
//! responses.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::store::kv::KvStore;

fn kv_key(user_id: &str, key: &str) -> String {
    format!("idem:{user_id}:{key}")
}

pub struct IdempotencyStore {
    kv: Arc<dyn KvStore>,
    window: Duration,
}

impl IdempotencyStore {
    pub fn new(kv: Arc<dyn KvStore>, window: Duration) -> Self {
        Self { kv, window }
    }

    /// Look up a previously-stored response for `(user_id, key)`.
    pub async fn get<T: DeserializeOwned>(&self, user_id: &str, key: &str) -> Option<T> {
        let bytes = self.kv.get(&kv_key(user_id, key)).await?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Persist `response` for `(user_id, key)` for the configured window.
    pub async fn put<T: Serialize>(&self, user_id: &str, key: &str, response: &T) {
        if let Ok(bytes) = serde_json::to_vec(response) {
            self.kv.put(&kv_key(user_id, key), bytes, self.window).await;
        }
    }
}

#[cfg(test)]
#[path = "idempotency_tests.rs"]
mod idempotency_tests;
