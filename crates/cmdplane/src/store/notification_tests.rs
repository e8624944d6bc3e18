use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::collaborators::push::LoggingPushProvider;

fn store() -> NotificationStore {
    NotificationStore::new(Arc::new(LoggingPushProvider), Duration::from_secs(300))
}

#[tokio::test]
async fn create_persists_and_returns_notification() {
    let store = store();
    let key = dedupe_key("webhook.pr_opened", "org/x", "5");
    let created = store
        .create("u1", "webhook.pr_opened", "PR #5 opened", HashMap::new(), "default", key, None)
        .await;
    assert!(created.is_some());
    assert_eq!(created.unwrap().priority, 4);
}

#[tokio::test]
async fn duplicate_dedupe_key_within_window_is_collapsed() {
    let store = store();
    let key = dedupe_key("webhook.pr_opened", "org/x", "5");
    let first = store
        .create("u1", "webhook.pr_opened", "PR #5 opened", HashMap::new(), "default", key.clone(), None)
        .await;
    let second = store
        .create("u1", "webhook.pr_opened", "PR #5 opened again", HashMap::new(), "default", key, None)
        .await;
    assert!(first.is_some());
    assert!(second.is_none());
}

#[tokio::test]
async fn low_priority_is_throttled_on_workout_profile() {
    let store = store();
    let key = dedupe_key("webhook.pr_labeled", "org/x", "5");
    let result = store
        .create("u1", "webhook.pr_labeled", "PR #5 labeled", HashMap::new(), "workout", key, None)
        .await;
    assert!(result.is_none());
}

#[tokio::test]
async fn same_event_passes_on_default_profile() {
    let store = store();
    let key = dedupe_key("webhook.pr_labeled", "org/x", "5");
    let result = store
        .create("u1", "webhook.pr_labeled", "PR #5 labeled", HashMap::new(), "default", key, None)
        .await;
    assert!(result.is_some());
}

#[tokio::test]
async fn list_scopes_to_user_and_sorts_newest_first() {
    let store = store();
    store
        .create(
            "u1",
            "webhook.pr_opened",
            "first",
            HashMap::new(),
            "default",
            dedupe_key("webhook.pr_opened", "org/x", "1"),
            None,
        )
        .await;
    store
        .create(
            "u2",
            "webhook.pr_opened",
            "other user",
            HashMap::new(),
            "default",
            dedupe_key("webhook.pr_opened", "org/x", "2"),
            None,
        )
        .await;
    let items = store.list("u1", None, 50).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].message, "first");
}

#[tokio::test]
async fn subscription_upsert_replaces_by_user_and_platform() {
    let store = store();
    let first = store.upsert_subscription("u1", Platform::Fcm, "device-a", None).await;
    let second = store.upsert_subscription("u1", Platform::Fcm, "device-b", None).await;
    let subs = store.list_subscriptions("u1").await;
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].id, second.id);
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn counters_track_created_collapsed_and_throttled() {
    let store = store();
    let key = dedupe_key("webhook.pr_opened", "org/x", "5");
    store.create("u1", "webhook.pr_opened", "PR #5 opened", HashMap::new(), "default", key.clone(), None).await;
    store.create("u1", "webhook.pr_opened", "PR #5 opened again", HashMap::new(), "default", key, None).await;
    store
        .create(
            "u1",
            "webhook.pr_labeled",
            "PR #9 labeled",
            HashMap::new(),
            "workout",
            dedupe_key("webhook.pr_labeled", "org/x", "9"),
            None,
        )
        .await;
    let (created, collapsed, throttled) = store.counters();
    assert_eq!(created, 1);
    assert_eq!(collapsed, 1);
    assert_eq!(throttled, 1);
}

#[tokio::test]
async fn repo_subscription_roundtrips_and_lists_subscribers() {
    let store = store();
    store.upsert_repo_subscription("u1", "org/x", None).await;
    store.upsert_repo_subscription("u2", "org/x", None).await;
    let subscribers = store.subscribers_of_repo("org/x").await;
    assert_eq!(subscribers.len(), 2);
    assert!(store.delete_repo_subscription("u1", "org/x").await);
    assert_eq!(store.subscribers_of_repo("org/x").await.len(), 1);
}
