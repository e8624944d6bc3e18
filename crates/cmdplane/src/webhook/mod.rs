// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook ingestion: signature verification, replay-protected
//! persistence into the event log, normalization, user routing, and
//! notification fan-out. Also wires in agent-task correlation on
//! `pull_request` events.

use std::collections::HashMap;

use ring::hmac;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{PlaneError, PlaneFailure};
use crate::state::AppState;
use crate::store::event_log::WebhookEvent;
use crate::store::notification::dedupe_key;

/// Verifies an `X-Hub-Signature-256` header against `payload` using
/// HMAC-SHA256 over `secret`. When `secret` is empty, the literal signature
/// string `"dev"` is accepted as a bypass.
pub fn verify_signature(secret: &str, signature: &str, payload: &[u8]) -> bool {
    if secret.is_empty() {
        return signature == "dev";
    }
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    hmac::verify(&key, payload, &expected).is_ok()
}

/// A webhook payload normalized into the shape the rest of the pipeline
/// reasons about. `None` fields mean the source payload
/// didn't carry that datum for this event type.
#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    pub event_type: String,
    pub action: Option<String>,
    pub repo: String,
    pub pr_number: Option<i64>,
    pub issue_number: Option<i64>,
    pub author: String,
    pub reference: Option<String>,
    pub sha: Option<String>,
    pub installation_id: Option<String>,
    pub pr_body: Option<String>,
}

/// Normalizes a raw GitHub webhook body for the given `X-GitHub-Event`
/// header. Returns `None` for event types or actions not in the closed set.
pub fn normalize(header_event: &str, payload: &Value) -> Option<NormalizedEvent> {
    let repo = payload.get("repository")?.get("full_name")?.as_str()?.to_owned();
    let author =
        payload.get("sender").and_then(|s| s.get("login")).and_then(Value::as_str).unwrap_or("unknown").to_owned();
    let installation_id = payload
        .get("installation")
        .and_then(|i| i.get("id"))
        .map(|id| id.to_string());

    let derived_type = match header_event {
        "pull_request" => {
            let action = payload.get("action").and_then(Value::as_str)?;
            let merged = payload
                .get("pull_request")
                .and_then(|pr| pr.get("merged"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            match action {
                "closed" if merged => "webhook.pr_merged",
                "closed" => "webhook.pr_closed",
                "opened" => "webhook.pr_opened",
                "reopened" => "webhook.pr_reopened",
                "synchronize" => "webhook.pr_synchronize",
                "labeled" => "webhook.pr_labeled",
                "unlabeled" => "webhook.pr_unlabeled",
                "review_requested" => "webhook.review_requested",
                _ => return None,
            }
        }
        "pull_request_review" => {
            let action = payload.get("action").and_then(Value::as_str)?;
            match action {
                "submitted" => "webhook.review_submitted",
                _ => return None,
            }
        }
        "check_suite" => {
            let action = payload.get("action").and_then(Value::as_str)?;
            if action != "completed" {
                return None;
            }
            let conclusion =
                payload.get("check_suite").and_then(|c| c.get("conclusion")).and_then(Value::as_str);
            match conclusion {
                Some("failure") | Some("timed_out") => "webhook.check_suite_failed",
                _ => "webhook.check_suite_completed",
            }
        }
        "issue_comment" => "webhook.issue_comment",
        _ => return None,
    };

    let pr_number =
        payload.get("pull_request").and_then(|pr| pr.get("number")).and_then(Value::as_i64);
    let issue_number = payload.get("issue").and_then(|i| i.get("number")).and_then(Value::as_i64);
    let sha = payload
        .get("pull_request")
        .and_then(|pr| pr.get("head"))
        .and_then(|h| h.get("sha"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| payload.get("after").and_then(Value::as_str).map(str::to_owned));
    let reference = payload.get("ref").and_then(Value::as_str).map(str::to_owned);
    let pr_body =
        payload.get("pull_request").and_then(|pr| pr.get("body")).and_then(Value::as_str).map(str::to_owned);

    Some(NormalizedEvent {
        event_type: derived_type.to_owned(),
        action: payload.get("action").and_then(Value::as_str).map(str::to_owned),
        repo,
        pr_number,
        issue_number,
        author,
        reference,
        sha,
        installation_id,
        pr_body,
    })
}

impl NormalizedEvent {
    /// Whichever of PR#/issue#/branch/commit is present, for the dedupe key.
    pub fn reference_for_dedupe(&self) -> String {
        self.pr_number
            .map(|n| n.to_string())
            .or_else(|| self.issue_number.map(|n| n.to_string()))
            .or_else(|| self.reference.clone())
            .or_else(|| self.sha.clone())
            .unwrap_or_default()
    }

    fn message(&self) -> String {
        match self.event_type.as_str() {
            "webhook.pr_merged" => format!("PR #{} merged in {}", self.pr_number.unwrap_or(0), self.repo),
            "webhook.pr_opened" => format!("PR #{} opened in {} by {}", self.pr_number.unwrap_or(0), self.repo, self.author),
            "webhook.pr_closed" => format!("PR #{} closed in {}", self.pr_number.unwrap_or(0), self.repo),
            "webhook.pr_reopened" => format!("PR #{} reopened in {}", self.pr_number.unwrap_or(0), self.repo),
            "webhook.pr_synchronize" => format!("PR #{} updated in {}", self.pr_number.unwrap_or(0), self.repo),
            "webhook.pr_labeled" => format!("PR #{} labeled in {}", self.pr_number.unwrap_or(0), self.repo),
            "webhook.pr_unlabeled" => format!("PR #{} unlabeled in {}", self.pr_number.unwrap_or(0), self.repo),
            "webhook.review_requested" => {
                format!("Review requested on PR #{} in {}", self.pr_number.unwrap_or(0), self.repo)
            }
            "webhook.review_submitted" => {
                format!("Review submitted on PR #{} in {}", self.pr_number.unwrap_or(0), self.repo)
            }
            "webhook.check_suite_failed" => format!("Checks failed in {}", self.repo),
            "webhook.check_suite_completed" => format!("Checks completed in {}", self.repo),
            "webhook.issue_comment" => format!("New comment on #{} in {}", self.issue_number.unwrap_or(0), self.repo),
            other => format!("{other} in {}", self.repo),
        }
    }
}

/// Result of an ingest call — always 202-shaped at the transport layer,
/// except for a signature mismatch which the transport layer maps to 400
/// before this function is even called.
pub struct IngestOutcome {
    pub event: WebhookEvent,
    pub duplicate: bool,
}

/// Runs spec §4.10 steps 3–7 against an already signature-checked payload:
/// insert into the event log (duplicate short-circuits cleanly), normalize,
/// route to subscribed users, create notifications, correlate agent tasks,
/// and mark the event processed.
pub async fn ingest(
    state: &AppState,
    source: &str,
    event_type_header: &str,
    delivery_id: &str,
    signature_ok: bool,
    payload: Vec<u8>,
) -> Result<IngestOutcome, PlaneFailure> {
    let event = match state.event_log.insert(source, event_type_header, delivery_id, signature_ok, payload).await
    {
        Ok(event) => event,
        Err(failure) if failure.kind == PlaneError::Conflict => {
            crate::metrics::Metrics::inc(&state.metrics.webhook_events_duplicate);
            let existing = state
                .event_log
                .list(crate::store::event_log::EventFilter { source: Some(source.to_owned()), ..Default::default() })
                .await
                .into_iter()
                .find(|e| e.delivery_id == delivery_id)
                .ok_or(failure)?;
            return Ok(IngestOutcome { event: existing, duplicate: true });
        }
        Err(failure) => return Err(failure),
    };

    crate::metrics::Metrics::inc(&state.metrics.webhook_events_ingested);
    process(state, &event).await;
    let event = state.event_log.get(event.id).await.unwrap_or(event);
    Ok(IngestOutcome { event, duplicate: false })
}

/// Runs normalization, routing, and notification fan-out for a stored
/// event, marking it processed. Shared by [`ingest`] and [`retry`].
pub async fn process(state: &AppState, event: &WebhookEvent) {
    let payload: Value = match serde_json::from_slice(&event.payload) {
        Ok(value) => value,
        Err(e) => {
            state.event_log.mark_processed(event.id, false, Some(format!("invalid json: {e}"))).await;
            return;
        }
    };

    let Some(normalized) = normalize(&event.event_type, &payload) else {
        // Unknown event types (or actions) are stored but not normalized.
        state.event_log.mark_processed(event.id, true, None).await;
        return;
    };

    if event.event_type == "pull_request" {
        if let Some(body) = normalized.pr_body.as_deref() {
            let pr_url = format!(
                "https://github.com/{}/pull/{}",
                normalized.repo,
                normalized.pr_number.unwrap_or(0)
            );
            if let Some(task) = state.agent_tasks.try_correlate(body, &pr_url).await {
                crate::metrics::Metrics::inc(&state.metrics.agent_tasks_correlated);
                let mut metadata = HashMap::new();
                metadata.insert("task_id".to_owned(), serde_json::json!(task.id));
                metadata.insert("pr_url".to_owned(), serde_json::json!(pr_url));
                state
                    .notifications
                    .create(
                        &task.user_id,
                        "agent.task_completed",
                        &format!("Your agent task finished: {pr_url}"),
                        metadata,
                        "default",
                        dedupe_key("agent.task_completed", &normalized.repo, &task.id.to_string()),
                        Some(4),
                    )
                    .await;
            }
        }
    }

    let recipients = route_recipients(state, &normalized).await;
    let message = normalized.message();
    let dedupe = dedupe_key(&normalized.event_type, &normalized.repo, &normalized.reference_for_dedupe());

    for user_id in recipients {
        let profile = state
            .sessions
            .get(&user_id)
            .await
            .and_then(|s| s.active_profile)
            .unwrap_or_else(|| "default".to_owned());

        let mut metadata = HashMap::new();
        metadata.insert("repo".to_owned(), serde_json::json!(normalized.repo));
        if let Some(n) = normalized.pr_number {
            metadata.insert("pr_number".to_owned(), serde_json::json!(n));
        }
        if let Some(n) = normalized.issue_number {
            metadata.insert("issue_number".to_owned(), serde_json::json!(n));
        }

        state
            .notifications
            .create(&user_id, &normalized.event_type, &message, metadata, &profile, dedupe.clone(), None)
            .await;
    }

    state.event_log.mark_processed(event.id, true, None).await;
}

/// Union of users subscribed to `repo` directly, or via the event's
/// installation id. The installation-id connection
/// store is out of scope (§1 code-host client); repo subscriptions alone
/// drive routing here.
async fn route_recipients(state: &AppState, normalized: &NormalizedEvent) -> Vec<String> {
    let mut recipients = state.notifications.subscribers_of_repo(&normalized.repo).await;
    recipients.sort();
    recipients.dedup();
    recipients
}

/// `POST /v1/webhooks/retry/{event_id}`: re-runs steps
/// 4-7 on a stored event.
pub async fn retry(state: &AppState, event_id: Uuid) -> Result<(), PlaneFailure> {
    let event = state.event_log.get(event_id).await.ok_or_else(|| PlaneFailure::not_found("unknown event"))?;
    process(state, &event).await;
    Ok(())
}
