// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent.delegate`: a write handler. `propose("delegate to
//! agent: {instruction}")`; on confirm, creates an `AgentTask` and
//! dispatches it, notifying the user later on completion.

use std::collections::HashMap;

use serde_json::Value;

use super::HandlerCtx;
use crate::command::HandlerOutcome;
use crate::error::PlaneError;
use crate::metrics::Metrics;
use crate::profile::ConfirmationPolicy;
use crate::store::session::Card;

pub async fn handle(
    ctx: &HandlerCtx<'_>,
    entities: &HashMap<String, Value>,
    confirmed: bool,
) -> HandlerOutcome {
    let instruction = match entities.get("instruction").and_then(Value::as_str) {
        Some(i) if !i.trim().is_empty() => i.trim().to_owned(),
        _ => {
            return HandlerOutcome::error(PlaneError::Validation, "What should the agent do?");
        }
    };

    if !confirmed && ctx.profile.confirmation_policy() != ConfirmationPolicy::Never {
        return HandlerOutcome::Propose {
            summary: format!("delegate to agent: {instruction}"),
            entities: entities.clone(),
        };
    }

    let provider = ctx.state.config.agent_default_provider.clone();
    let task = ctx.state.agent_tasks.create(ctx.user_id, &provider, &instruction).await;
    Metrics::inc(&ctx.state.metrics.agent_tasks_created);
    ctx.state.agent_tasks.dispatch(task.id).await;

    let card = Card {
        kind: "agent_task".to_owned(),
        title: format!("Agent task {}", task.id),
        subtitle: Some(instruction),
        lines: vec!["Dispatched".to_owned()],
        deep_link: None,
    };

    HandlerOutcome::Executed {
        spoken: "Delegated. I'll notify you when done.".to_owned(),
        cards: vec![card],
    }
}
