// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-action manager: issues and consumes confirmation
//! tokens with TTL and exactly-once semantics, built directly on the KV's
//! `consume_if_present` primitive.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlaneFailure;
use crate::state::epoch_ms;
use crate::store::kv::KvStore;

/// A deferred side effect awaiting user confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    pub token: String,
    pub intent_name: String,
    pub entities: HashMap<String, Value>,
    pub summary: String,
    pub user_id: String,
    pub session_id: String,
    pub created_at: u64,
    pub expires_at: u64,
}

pub struct PendingActionManager {
    kv: Arc<dyn KvStore>,
    default_ttl: Duration,
}

fn generate_token() -> String {
    let mut bytes = [0u8; 16]; // 128 bits
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

fn kv_key(token: &str) -> String {
    format!("pending_action:{token}")
}

impl PendingActionManager {
    pub fn new(kv: Arc<dyn KvStore>, default_ttl: Duration) -> Self {
        Self { kv, default_ttl }
    }

    /// `Create(intent_name, entities, summary, user_id, session_id, ttl) -> token`.
    pub async fn create(
        &self,
        intent_name: &str,
        entities: HashMap<String, Value>,
        summary: &str,
        user_id: &str,
        session_id: &str,
        ttl: Option<Duration>,
    ) -> String {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let token = generate_token();
        let now = epoch_ms();
        let action = PendingAction {
            token: token.clone(),
            intent_name: intent_name.to_owned(),
            entities,
            summary: summary.to_owned(),
            user_id: user_id.to_owned(),
            session_id: session_id.to_owned(),
            created_at: now,
            expires_at: now + ttl.as_millis() as u64,
        };
        // Serialization of our own freshly-built struct never fails.
        if let Ok(bytes) = serde_json::to_vec(&action) {
            self.kv.put(&kv_key(&token), bytes, ttl).await;
        }
        tracing::info!(token = %token, intent = intent_name, user_id, session_id, "pending action created");
        token
    }

    /// `Peek(token) -> pending_action`. Does not consume.
    pub async fn peek(&self, token: &str) -> Result<PendingAction, PlaneFailure> {
        let bytes =
            self.kv.get(&kv_key(token)).await.ok_or_else(|| PlaneFailure::not_found("unknown or expired token"))?;
        decode(&bytes)
    }

    /// `Consume(token) -> pending_action`. Atomic: at most one caller across
    /// all concurrency observes success.
    pub async fn consume(&self, token: &str) -> Result<PendingAction, PlaneFailure> {
        let bytes = self
            .kv
            .consume_if_present(&kv_key(token))
            .await
            .ok_or_else(|| PlaneFailure::not_found("unknown or already-consumed token"))?;
        let action = decode(&bytes)?;
        tracing::info!(token = %token, intent = %action.intent_name, "pending action consumed");
        Ok(action)
    }
}

fn decode(bytes: &[u8]) -> Result<PendingAction, PlaneFailure> {
    serde_json::from_slice(bytes).map_err(|e| PlaneFailure::internal(format!("corrupt pending action: {e}")))
}

#[cfg(test)]
#[path = "pending_action_tests.rs"]
mod pending_action_tests;
