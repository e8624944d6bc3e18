// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pr.request_review`: a write handler. `propose("request
//! review from {reviewer} on PR {pr_number}", entities)`; on confirm, calls
//! the code-host collaborator.

use std::collections::HashMap;

use serde_json::Value;

use super::{focus_repo, resolve_pr_number, write_call, HandlerCtx};
use crate::command::HandlerOutcome;
use crate::error::PlaneError;
use crate::profile::ConfirmationPolicy;

pub async fn handle(
    ctx: &HandlerCtx<'_>,
    entities: &HashMap<String, Value>,
    confirmed: bool,
) -> HandlerOutcome {
    let pr_number = match resolve_pr_number(entities, &ctx.session) {
        Ok(n) => n,
        Err(outcome) => return outcome,
    };
    let reviewer = match entities.get("reviewer").and_then(Value::as_str) {
        Some(r) => r.to_owned(),
        None => {
            return HandlerOutcome::error(
                PlaneError::Validation,
                "Who should I request a review from?",
            )
        }
    };
    let repo = focus_repo(ctx);

    if !ctx.state.repo_policy.allows_write(ctx.user_id, &repo).await {
        return HandlerOutcome::error(
            PlaneError::Forbidden,
            format!("Write access to {repo} is disabled."),
        );
    }

    if !confirmed && ctx.profile.confirmation_policy() != ConfirmationPolicy::Never {
        return HandlerOutcome::Propose {
            summary: format!("request review from {reviewer} on PR {pr_number}"),
            entities: entities.clone(),
        };
    }

    match write_call(ctx, ctx.state.codehost.request_review(&repo, pr_number, &reviewer)).await {
        Ok(()) => HandlerOutcome::Executed { spoken: "Review requested.".to_owned(), cards: vec![] },
        Err(outcome) => outcome,
    }
}
