// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session context: short-lived per-session state. TTL refreshes
//! on every read and write; absence is always `None` — handlers interpret
//! that uniformly as "no prior context".

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::kv::KvStore;

/// A UI card attached to a command response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_link: Option<String>,
}

/// Transient per-session state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub last_response_spoken_text: Option<String>,
    pub last_cards: Vec<Card>,
    pub focus_repo: Option<String>,
    pub focus_pr: Option<i64>,
    pub list_cursor: Option<u64>,
    /// Token of the most recent *outstanding* pending action issued in this
    /// session, so `system.confirm`/`system.cancel` have
    /// something to resolve against without a separate session->token index.
    pub pending_action_token: Option<String>,
    /// Set by `system.set_profile`; the router prefers this over the
    /// profile passed with each `Handle` call when present (supplemented
    /// behavior — spec.md's profile parameter is otherwise re-supplied by
    /// the client on every call).
    pub active_profile: Option<String>,
}

fn kv_key(session_id: &str) -> String {
    format!("session:{session_id}")
}

pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    /// `Get(session_id)`. Extends TTL. Returns `None` if no session yet.
    pub async fn get(&self, session_id: &str) -> Option<SessionContext> {
        let bytes = self.kv.get(&kv_key(session_id)).await?;
        self.kv.touch(&kv_key(session_id), self.ttl).await;
        serde_json::from_slice(&bytes).ok()
    }

    async fn save(&self, session_id: &str, ctx: &SessionContext) {
        if let Ok(bytes) = serde_json::to_vec(ctx) {
            self.kv.put(&kv_key(session_id), bytes, self.ttl).await;
        }
    }

    async fn mutate(&self, session_id: &str, f: impl FnOnce(&mut SessionContext)) {
        let mut ctx = self.get(session_id).await.unwrap_or_default();
        f(&mut ctx);
        self.save(session_id, &ctx).await;
    }

    pub async fn set_repo_pr(&self, session_id: &str, repo: impl Into<String>, pr: i64) {
        let repo = repo.into();
        self.mutate(session_id, |ctx| {
            ctx.focus_repo = Some(repo);
            ctx.focus_pr = Some(pr);
        })
        .await;
    }

    pub async fn set_last_response(&self, session_id: &str, spoken: impl Into<String>, cards: Vec<Card>) {
        let spoken = spoken.into();
        self.mutate(session_id, |ctx| {
            ctx.last_response_spoken_text = Some(spoken);
            ctx.last_cards = cards;
        })
        .await;
    }

    pub async fn set_list_cursor(&self, session_id: &str, cursor: u64) {
        self.mutate(session_id, |ctx| ctx.list_cursor = Some(cursor)).await;
    }

    pub async fn set_pending_action_token(&self, session_id: &str, token: Option<String>) {
        self.mutate(session_id, |ctx| ctx.pending_action_token = token).await;
    }

    pub async fn set_active_profile(&self, session_id: &str, profile: impl Into<String>) {
        let profile = profile.into();
        self.mutate(session_id, |ctx| ctx.active_profile = Some(profile)).await;
    }

    pub async fn clear(&self, session_id: &str) {
        self.kv.delete(&kv_key(session_id)).await;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
