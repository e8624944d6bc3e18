// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intent handlers: one module per handler, dispatched by name
//! from the router. Every handler returns a [`HandlerOutcome`]; write
//! handlers additionally accept a `confirmed` flag so the same function
//! serves both the initial proposal and the router's confirm path.

mod agent_delegate;
mod agent_progress;
mod checks_status;
mod inbox;
mod navigation_next;
mod pr_merge;
mod pr_request_review;
mod pr_summarize;
mod system_set_profile;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::collaborators::codehost::{CodeHostError, CodeHostErrorKind, PullRequest};
use crate::command::HandlerOutcome;
use crate::error::PlaneError;
use crate::profile::Profile;
use crate::state::AppState;
use crate::store::session::SessionContext;

/// Everything a handler needs: shared state, the caller's identity, the
/// entities the intent parser (or a replayed pending action) produced, the
/// session snapshot taken before dispatch, and the effective profile.
pub struct HandlerCtx<'a> {
    pub state: &'a Arc<AppState>,
    pub user_id: &'a str,
    pub session_id: &'a str,
    pub session: Option<SessionContext>,
    pub profile: Profile,
}

/// Write-class intents that must flow through the pending-action protocol
/// unless the profile's confirmation policy is `never`.
pub fn is_write_intent(intent_name: &str) -> bool {
    matches!(intent_name, "pr.request_review" | "pr.merge" | "agent.delegate")
}

/// Dispatch `intent_name` to its handler. `confirmed` is `true` only when
/// called from the router's confirm path (entities come from the consumed
/// pending action) or when the active profile's confirmation policy is
/// `never`.
pub async fn dispatch(
    intent_name: &str,
    entities: &HashMap<String, Value>,
    ctx: &HandlerCtx<'_>,
    confirmed: bool,
) -> HandlerOutcome {
    match intent_name {
        "inbox.list" => inbox::handle(ctx).await,
        "pr.summarize" => pr_summarize::handle(ctx, entities).await,
        "pr.request_review" => pr_request_review::handle(ctx, entities, confirmed).await,
        "pr.merge" => pr_merge::handle(ctx, entities, confirmed).await,
        "checks.status" => checks_status::handle(ctx, entities).await,
        "agent.delegate" => agent_delegate::handle(ctx, entities, confirmed).await,
        "agent.progress" => agent_progress::handle(ctx, entities).await,
        "navigation.next" => navigation_next::handle(ctx).await,
        "system.set_profile" => system_set_profile::handle(ctx, entities).await,
        other => HandlerOutcome::error(
            PlaneError::Validation,
            format!("no handler registered for intent '{other}'"),
        ),
    }
}

/// Per-item priority for inbox ordering: 5
/// urgent/security, 4 bug, 3 reviewer-or-assignee, 2 other.
pub fn priority_of(pr: &PullRequest) -> u8 {
    if pr.is_security {
        5
    } else if pr.is_bug {
        4
    } else if pr.user_is_reviewer_or_assignee {
        3
    } else {
        2
    }
}

/// Sort by priority desc, then `updated_at` desc.
pub fn sorted_inbox(mut prs: Vec<PullRequest>) -> Vec<PullRequest> {
    prs.sort_by(|a, b| {
        priority_of(b).cmp(&priority_of(a)).then(b.updated_at_ms.cmp(&a.updated_at_ms))
    });
    prs
}

pub fn card_for_pr(pr: &PullRequest) -> crate::store::session::Card {
    crate::store::session::Card {
        kind: "pr".to_owned(),
        title: format!("PR #{}", pr.number),
        subtitle: Some(pr.title.clone()),
        lines: vec![format!("by {}", pr.author)],
        deep_link: None,
    }
}

/// `pr_number` resolution: parsed entity, else `session.focus_pr`, else a
/// clarifying validation error.
pub fn resolve_pr_number(
    entities: &HashMap<String, Value>,
    session: &Option<SessionContext>,
) -> Result<i64, HandlerOutcome> {
    if let Some(n) = entities.get("pr_number").and_then(Value::as_i64) {
        return Ok(n);
    }
    if let Some(pr) = session.as_ref().and_then(|s| s.focus_pr) {
        return Ok(pr);
    }
    Err(HandlerOutcome::error(PlaneError::Validation, "Which PR?"))
}

/// The fixture code host carries a single demo repository; real deployments
/// would read this from the PR lookup itself. Falls back to the session's
/// focus repo when set.
pub fn focus_repo(ctx: &HandlerCtx<'_>) -> String {
    ctx.session.as_ref().and_then(|s| s.focus_repo.clone()).unwrap_or_else(|| "demo/repo".to_owned())
}

pub fn map_codehost_err(err: CodeHostError) -> HandlerOutcome {
    let kind = match err.kind {
        CodeHostErrorKind::RateLimit => PlaneError::RateLimited,
        CodeHostErrorKind::Auth => PlaneError::Auth,
        CodeHostErrorKind::NotFound => PlaneError::NotFound,
    };
    HandlerOutcome::error(kind, err.to_string())
}

/// Runs a code-host read call under `codehost_read_deadline` (spec §5: "10s
/// for code-host read"), mapping an elapsed deadline to
/// `error(kind="timeout")` the same way STT's deadline does in
/// `router::resolve_text`.
pub async fn read_call<T, F>(ctx: &HandlerCtx<'_>, call: F) -> Result<T, HandlerOutcome>
where
    F: std::future::Future<Output = Result<T, CodeHostError>>,
{
    match tokio::time::timeout(ctx.state.config.codehost_read_deadline(), call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(map_codehost_err(err)),
        Err(_) => Err(HandlerOutcome::error(PlaneError::Timeout, "Timed out reaching the code host.")),
    }
}

/// Runs a code-host write call under `codehost_write_deadline` (spec §5:
/// "15s for write").
pub async fn write_call<T, F>(ctx: &HandlerCtx<'_>, call: F) -> Result<T, HandlerOutcome>
where
    F: std::future::Future<Output = Result<T, CodeHostError>>,
{
    match tokio::time::timeout(ctx.state.config.codehost_write_deadline(), call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(map_codehost_err(err)),
        Err(_) => Err(HandlerOutcome::error(PlaneError::Timeout, "Timed out reaching the code host.")),
    }
}
