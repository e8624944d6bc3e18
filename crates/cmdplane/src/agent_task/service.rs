// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AgentTaskService`: owns every `AgentTask`, mediates
//! dispatch, and correlates completion from a later webhook event.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::provider::{DispatchProvider, GithubIssueDispatchProvider, MockDispatchProvider};
use super::{AgentTask, AgentTaskState};
use crate::state::epoch_ms;

fn metadata_re() -> Regex {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"<!--\s*agent_task_metadata\s*\{"task_id":"([^"]+)"\}\s*-->"#).unwrap()
}

fn fixes_re() -> Regex {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)fixes\s+([\w.-]+/[\w.-]+)#(\d+)").unwrap()
}

pub struct AgentTaskService {
    tasks: RwLock<HashMap<Uuid, AgentTask>>,
    dispatch_repo: String,
    github_provider: Arc<dyn DispatchProvider>,
    mock_provider: Arc<dyn DispatchProvider>,
}

impl AgentTaskService {
    pub fn new(dispatch_repo: String) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            github_provider: Arc::new(GithubIssueDispatchProvider::new(dispatch_repo.clone())),
            mock_provider: Arc::new(MockDispatchProvider),
            dispatch_repo,
        }
    }

    fn provider_for(&self, provider_name: &str) -> Arc<dyn DispatchProvider> {
        match provider_name {
            "github_issue_dispatch" => Arc::clone(&self.github_provider),
            _ => Arc::clone(&self.mock_provider),
        }
    }

    pub async fn create(&self, user_id: &str, provider: &str, instruction: &str) -> AgentTask {
        let now = epoch_ms();
        let task = AgentTask {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            provider: provider.to_owned(),
            instruction: instruction.to_owned(),
            state: AgentTaskState::Created,
            trace: HashMap::new(),
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.insert(task.id, task.clone());
        task
    }

    pub async fn get(&self, task_id: Uuid) -> Option<AgentTask> {
        self.tasks.read().await.get(&task_id).cloned()
    }

    /// Runs the provider, transitioning `created -> running` pending later
    /// correlation (both providers behave this way; see
    /// `provider::MockDispatchProvider`). Dispatch failures transition to
    /// `failed` with the error recorded in the trace.
    pub async fn dispatch(&self, task_id: Uuid) -> Option<AgentTask> {
        let provider_name = self.tasks.read().await.get(&task_id)?.provider.clone();
        let provider = self.provider_for(&provider_name);

        let instruction = self.tasks.read().await.get(&task_id)?.instruction.clone();
        match provider.dispatch(&task_id.to_string(), &instruction).await {
            Ok(outcome) => {
                let next = if outcome.completed_immediately {
                    AgentTaskState::Completed
                } else {
                    AgentTaskState::Running
                };
                self.update_state(task_id, next, outcome.trace_delta).await
            }
            Err(err) => {
                let mut trace_delta = HashMap::new();
                trace_delta.insert("error".to_owned(), serde_json::json!(err.to_string()));
                self.update_state(task_id, AgentTaskState::Failed, trace_delta).await
            }
        }
    }

    pub async fn update_state(
        &self,
        task_id: Uuid,
        new_state: AgentTaskState,
        trace_delta: HashMap<String, serde_json::Value>,
    ) -> Option<AgentTask> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&task_id)?;
        if !task.state.can_transition_to(new_state) {
            tracing::warn!(task_id = %task_id, from = ?task.state, to = ?new_state, "rejected invalid agent-task transition");
            return Some(task.clone());
        }
        task.state = new_state;
        task.trace.extend(trace_delta);
        task.updated_at = epoch_ms();
        Some(task.clone())
    }

    /// Attempts to match a `pull_request` webhook body back to a running
    /// task, either via the literal metadata comment or a "Fixes repo#N"
    /// reference resolved against the dispatch repo's issue number recorded
    /// in trace. Returns the task if it transitioned to completed.
    pub async fn try_correlate(&self, pr_body: &str, pr_url: &str) -> Option<AgentTask> {
        let task_id = if let Some(cap) = metadata_re().captures(pr_body) {
            cap.get(1)?.as_str().parse::<Uuid>().ok()
        } else if let Some(cap) = fixes_re().captures(pr_body) {
            let repo = cap.get(1)?.as_str();
            let issue_number: i64 = cap.get(2)?.as_str().parse().ok()?;
            if repo != self.dispatch_repo {
                return None;
            }
            self.find_task_by_issue_number(issue_number).await
        } else {
            None
        }?;

        let task = self.tasks.read().await.get(&task_id).cloned()?;
        if task.state != AgentTaskState::Running {
            return None;
        }

        let mut trace_delta = HashMap::new();
        trace_delta.insert("pr_url".to_owned(), serde_json::json!(pr_url));
        self.update_state(task_id, AgentTaskState::Completed, trace_delta).await
    }

    /// Most recently created task for a user — used by `agent.progress`
    /// when the transcript didn't name a `task_id`.
    pub async fn latest_for_user(&self, user_id: &str) -> Option<AgentTask> {
        self.tasks
            .read()
            .await
            .values()
            .filter(|t| t.user_id == user_id)
            .max_by_key(|t| t.created_at)
            .cloned()
    }

    async fn find_task_by_issue_number(&self, issue_number: i64) -> Option<Uuid> {
        self.tasks
            .read()
            .await
            .values()
            .find(|t| {
                t.trace.get("issue_number").and_then(|v| v.as_i64()) == Some(issue_number)
            })
            .map(|t| t.id)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
