// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pr.merge`: a write handler. `propose("merge PR
//! {pr_number}")`; on confirm, verifies all checks pass (unless
//! `force_merge` is set) then merges.

use std::collections::HashMap;

use serde_json::Value;

use super::{focus_repo, read_call, resolve_pr_number, write_call, HandlerCtx};
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
    let repo = focus_repo(ctx);

    if !ctx.state.repo_policy.allows_write(ctx.user_id, &repo).await {
        return HandlerOutcome::error(
            PlaneError::Forbidden,
            format!("Write access to {repo} is disabled."),
        );
    }

    if !confirmed && ctx.profile.confirmation_policy() != ConfirmationPolicy::Never {
        return HandlerOutcome::Propose {
            summary: format!("merge PR {pr_number}"),
            entities: entities.clone(),
        };
    }

    let force = entities.get("force_merge").and_then(Value::as_bool).unwrap_or(false);
    if !force {
        let checks = match read_call(ctx, ctx.state.codehost.get_checks(&repo, pr_number)).await {
            Ok(checks) => checks,
            Err(outcome) => return outcome,
        };
        let failing: Vec<&str> =
            checks.iter().filter(|c| !c.passing).map(|c| c.name.as_str()).collect();
        if !failing.is_empty() {
            return HandlerOutcome::error(
                PlaneError::Conflict,
                format!("Checks are still failing on PR {pr_number}: {}.", failing.join(", ")),
            );
        }
    }

    match write_call(ctx, ctx.state.codehost.merge(&repo, pr_number)).await {
        Ok(()) => {
            HandlerOutcome::Executed { spoken: format!("PR {pr_number} merged."), cards: vec![] }
        }
        Err(outcome) => outcome,
    }
}
