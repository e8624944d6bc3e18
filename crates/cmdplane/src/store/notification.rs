// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification Store: dedupe/throttle-aware
//! notification creation, subscription CRUD, and fire-and-forget delivery.
//! Write-heavy and read-mostly by different axes, so it is a plain
//! `RwLock<HashMap>` rather than KV-backed, the same shape as
//! `store::repo_policy::RepoPolicyStore`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ring::digest::{digest, SHA256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborators::push::{Platform, PushProvider};
use crate::state::epoch_ms;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub event_type: String,
    pub message: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub priority: u8,
    pub profile: String,
    pub dedupe_key: String,
    pub created_at: u64,
    pub read_at: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSubscription {
    pub id: Uuid,
    pub user_id: String,
    pub platform: Platform,
    pub endpoint: String,
    pub keys: Option<serde_json::Value>,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSubscription {
    pub user_id: String,
    pub repo_full_name: String,
    pub installation_id: Option<String>,
    pub created_at: u64,
}

/// Derives `(event_type, repo, ref)` into a stable dedupe key. `ref` is
/// whichever of PR#/issue#/branch/commit is present, already resolved by
/// the caller into a single string.
pub fn dedupe_key(event_type: &str, repo: &str, reference: &str) -> String {
    let input = format!("{event_type}\0{repo}\0{reference}");
    hex::encode(digest(&SHA256, input.as_bytes()).as_ref())
}

fn priority_for_event(event_type: &str) -> u8 {
    match event_type {
        "webhook.pr_merged" | "webhook.check_suite_failed" => 5,
        t if t.starts_with("security.") => 5,
        "webhook.pr_opened" | "webhook.pr_closed" | "webhook.review_requested"
        | "webhook.review_submitted" => 4,
        "webhook.pr_synchronize" | "webhook.pr_reopened" | "webhook.check_suite_completed" => 3,
        "webhook.pr_labeled" | "webhook.pr_unlabeled" | "webhook.issue_comment" => 2,
        _ => 3,
    }
}

fn threshold_for_profile(profile: &str) -> u8 {
    match profile {
        "workout" => 4,
        "commute" => 3,
        "kitchen" => 2,
        _ => 1,
    }
}

pub struct NotificationStore {
    notifications: tokio::sync::RwLock<HashMap<Uuid, Notification>>,
    dedupe_index: tokio::sync::RwLock<HashMap<(String, String), u64>>,
    subscriptions: tokio::sync::RwLock<HashMap<(String, Platform), NotificationSubscription>>,
    repo_subscriptions: tokio::sync::RwLock<HashMap<(String, String), RepoSubscription>>,
    push: Arc<dyn PushProvider>,
    dedupe_window: Duration,
    push_deadline: Duration,
    created_count: AtomicU64,
    collapsed_count: AtomicU64,
    throttled_count: AtomicU64,
}

impl NotificationStore {
    pub fn new(push: Arc<dyn PushProvider>, dedupe_window: Duration) -> Self {
        Self::with_push_deadline(push, dedupe_window, Duration::from_secs(2))
    }

    /// Per-endpoint push-provider call deadline (spec §5: "2s for push per
    /// endpoint"), mirroring the code-host read/write deadlines.
    pub fn with_push_deadline(
        push: Arc<dyn PushProvider>,
        dedupe_window: Duration,
        push_deadline: Duration,
    ) -> Self {
        Self {
            notifications: tokio::sync::RwLock::new(HashMap::new()),
            dedupe_index: tokio::sync::RwLock::new(HashMap::new()),
            subscriptions: tokio::sync::RwLock::new(HashMap::new()),
            repo_subscriptions: tokio::sync::RwLock::new(HashMap::new()),
            push,
            dedupe_window,
            push_deadline,
            created_count: AtomicU64::new(0),
            collapsed_count: AtomicU64::new(0),
            throttled_count: AtomicU64::new(0),
        }
    }

    /// Create/collapsed/throttled counters, folded into `GET /v1/metrics`
    /// alongside the process-wide `Metrics` counters.
    pub fn counters(&self) -> (u64, u64, u64) {
        (
            self.created_count.load(Ordering::Relaxed),
            self.collapsed_count.load(Ordering::Relaxed),
            self.throttled_count.load(Ordering::Relaxed),
        )
    }

    /// Returns `None` when the notification was collapsed (dedupe) or
    /// throttled (below the profile's priority threshold) — both are
    /// silent no-ops, never errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: &str,
        event_type: &str,
        message: &str,
        metadata: HashMap<String, serde_json::Value>,
        profile: &str,
        dedupe_key: String,
        priority: Option<u8>,
    ) -> Option<Notification> {
        let priority = priority.unwrap_or_else(|| priority_for_event(event_type));
        let now = epoch_ms();

        {
            let index = self.dedupe_index.read().await;
            if let Some(&last) = index.get(&(user_id.to_owned(), dedupe_key.clone())) {
                if now.saturating_sub(last) < self.dedupe_window.as_millis() as u64 {
                    self.collapsed_count.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        if priority < threshold_for_profile(profile) {
            self.throttled_count.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            event_type: event_type.to_owned(),
            message: message.to_owned(),
            metadata,
            priority,
            profile: profile.to_owned(),
            dedupe_key: dedupe_key.clone(),
            created_at: now,
            read_at: None,
        };

        self.dedupe_index.write().await.insert((user_id.to_owned(), dedupe_key), now);
        self.notifications.write().await.insert(notification.id, notification.clone());
        self.created_count.fetch_add(1, Ordering::Relaxed);

        self.deliver(&notification).await;
        Some(notification)
    }

    async fn deliver(&self, notification: &Notification) {
        let subs: Vec<NotificationSubscription> = self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == notification.user_id)
            .cloned()
            .collect();

        let payload = serde_json::json!({
            "id": notification.id,
            "event_type": notification.event_type,
            "message": notification.message,
            "priority": notification.priority,
        });

        for sub in subs {
            match tokio::time::timeout(self.push_deadline, self.push.send(&sub.endpoint, sub.platform, &payload))
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(
                        user_id = %notification.user_id,
                        endpoint = %sub.endpoint,
                        error = %err,
                        "notification delivery failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        user_id = %notification.user_id,
                        endpoint = %sub.endpoint,
                        "notification delivery timed out"
                    );
                }
            }
        }
    }

    pub async fn list(&self, user_id: &str, since_ms: Option<u64>, limit: usize) -> Vec<Notification> {
        let limit = limit.clamp(1, 100);
        let mut items: Vec<Notification> = self
            .notifications
            .read()
            .await
            .values()
            .filter(|n| n.user_id == user_id)
            .filter(|n| since_ms.map_or(true, |since| n.created_at >= since))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        items
    }

    pub async fn get(&self, user_id: &str, id: Uuid) -> Option<Notification> {
        self.notifications
            .read()
            .await
            .get(&id)
            .filter(|n| n.user_id == user_id)
            .cloned()
    }

    pub async fn upsert_subscription(
        &self,
        user_id: &str,
        platform: Platform,
        endpoint: &str,
        keys: Option<serde_json::Value>,
    ) -> NotificationSubscription {
        let subscription = NotificationSubscription {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            platform,
            endpoint: endpoint.to_owned(),
            keys,
            created_at: epoch_ms(),
        };
        self.subscriptions
            .write()
            .await
            .insert((user_id.to_owned(), platform), subscription.clone());
        subscription
    }

    pub async fn list_subscriptions(&self, user_id: &str) -> Vec<NotificationSubscription> {
        self.subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn delete_subscription(&self, user_id: &str, id: Uuid) -> bool {
        let mut subs = self.subscriptions.write().await;
        let key = subs
            .iter()
            .find(|(_, s)| s.user_id == user_id && s.id == id)
            .map(|(k, _)| k.clone());
        match key {
            Some(key) => {
                subs.remove(&key);
                true
            }
            None => false,
        }
    }

    pub async fn upsert_repo_subscription(
        &self,
        user_id: &str,
        repo_full_name: &str,
        installation_id: Option<String>,
    ) -> RepoSubscription {
        let subscription = RepoSubscription {
            user_id: user_id.to_owned(),
            repo_full_name: repo_full_name.to_owned(),
            installation_id,
            created_at: epoch_ms(),
        };
        self.repo_subscriptions
            .write()
            .await
            .insert((user_id.to_owned(), repo_full_name.to_owned()), subscription.clone());
        subscription
    }

    pub async fn list_repo_subscriptions(&self, user_id: &str) -> Vec<RepoSubscription> {
        self.repo_subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn delete_repo_subscription(&self, user_id: &str, repo_full_name: &str) -> bool {
        self.repo_subscriptions
            .write()
            .await
            .remove(&(user_id.to_owned(), repo_full_name.to_owned()))
            .is_some()
    }

    /// Every user with a `RepoSubscription` on `repo`, for webhook fan-out.
    pub async fn subscribers_of_repo(&self, repo_full_name: &str) -> Vec<String> {
        self.repo_subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.repo_full_name == repo_full_name)
            .map(|s| s.user_id.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod notification_tests;
