// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process counters exposed at `GET /v1/metrics` when `metrics_enabled` is
//! set.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    pub commands_handled: AtomicU64,
    pub webhook_events_ingested: AtomicU64,
    pub webhook_events_duplicate: AtomicU64,
    pub pending_actions_issued: AtomicU64,
    pub pending_actions_consumed: AtomicU64,
    pub agent_tasks_created: AtomicU64,
    pub agent_tasks_correlated: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// `notifications` counters live on [`crate::store::notification::NotificationStore`]
    /// itself (it already distinguishes created/collapsed/throttled at the
    /// point of decision) and are folded in here rather than duplicated.
    pub fn snapshot(&self, notifications: &crate::store::notification::NotificationStore) -> serde_json::Value {
        let (created, collapsed, throttled) = notifications.counters();
        serde_json::json!({
            "commands_handled": self.commands_handled.load(Ordering::Relaxed),
            "webhook_events_ingested": self.webhook_events_ingested.load(Ordering::Relaxed),
            "webhook_events_duplicate": self.webhook_events_duplicate.load(Ordering::Relaxed),
            "notifications_created": created,
            "notifications_collapsed": collapsed,
            "notifications_throttled": throttled,
            "pending_actions_issued": self.pending_actions_issued.load(Ordering::Relaxed),
            "pending_actions_consumed": self.pending_actions_consumed.load(Ordering::Relaxed),
            "agent_tasks_created": self.agent_tasks_created.load(Ordering::Relaxed),
            "agent_tasks_correlated": self.agent_tasks_correlated.load(Ordering::Relaxed),
        })
    }

    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
