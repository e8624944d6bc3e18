// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agent.progress`: state-appropriate text for an agent task,
//! looked up by id or (when omitted) the caller's most recent task.

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use super::HandlerCtx;
use crate::agent_task::{AgentTask, AgentTaskState};
use crate::command::HandlerOutcome;
use crate::error::PlaneError;
use crate::store::session::Card;

pub async fn handle(ctx: &HandlerCtx<'_>, entities: &HashMap<String, Value>) -> HandlerOutcome {
    let task = match entities.get("task_id").and_then(Value::as_str) {
        Some(raw) => match raw.parse::<Uuid>() {
            Ok(id) => ctx.state.agent_tasks.get(id).await,
            Err(_) => None,
        },
        None => ctx.state.agent_tasks.latest_for_user(ctx.user_id).await,
    };

    match task {
        Some(task) if task.user_id == ctx.user_id => {
            let spoken = state_text(&task);
            let card = Card {
                kind: "agent_task".to_owned(),
                title: format!("Agent task {}", task.id),
                subtitle: Some(format!("{:?}", task.state).to_lowercase()),
                lines: vec![task.instruction.clone()],
                deep_link: None,
            };
            HandlerOutcome::Final { spoken, cards: vec![card] }
        }
        _ => HandlerOutcome::error(PlaneError::NotFound, "I couldn't find that agent task."),
    }
}

fn state_text(task: &AgentTask) -> String {
    match task.state {
        AgentTaskState::Created => "Your agent task hasn't started yet.".to_owned(),
        AgentTaskState::Running => "Your agent is still working on it.".to_owned(),
        AgentTaskState::Completed => "Your agent finished the task.".to_owned(),
        AgentTaskState::Failed => "Your agent task failed.".to_owned(),
        AgentTaskState::Cancelled => "Your agent task was cancelled.".to_owned(),
    }
}
