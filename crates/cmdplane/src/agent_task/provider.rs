// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch providers: where a created `AgentTask` is actually
//! sent. Both providers leave the task `running` pending correlation from a
//! later webhook — `mock` does no actual external dispatch but still waits
//! for the caller to inject a `pull_request` event carrying the task's
//! metadata comment (spec §8 scenario 6); `github_issue_dispatch` opens an
//! issue carrying that same comment itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Clone)]
pub struct DispatchError(pub String);

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent dispatch failed: {}", self.0)
    }
}

impl std::error::Error for DispatchError {}

pub struct DispatchOutcome {
    pub completed_immediately: bool,
    pub trace_delta: HashMap<String, serde_json::Value>,
}

#[async_trait::async_trait]
pub trait DispatchProvider: Send + Sync {
    async fn dispatch(
        &self,
        task_id: &str,
        instruction: &str,
    ) -> Result<DispatchOutcome, DispatchError>;
}

/// Accepts the task without contacting any external system, leaving it
/// `running` until a later webhook correlates it back to completion; used
/// for tests and local dev where there is no real agent worker to report
/// back, but the correlation path still needs to be exercised.
pub struct MockDispatchProvider;

#[async_trait::async_trait]
impl DispatchProvider for MockDispatchProvider {
    async fn dispatch(
        &self,
        task_id: &str,
        instruction: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut trace_delta = HashMap::new();
        trace_delta.insert("instruction".to_owned(), serde_json::json!(instruction));
        trace_delta.insert("dispatched_via".to_owned(), serde_json::json!("mock"));
        tracing::info!(task_id, "mock agent dispatch accepted, awaiting correlation");
        Ok(DispatchOutcome { completed_immediately: false, trace_delta })
    }
}

/// Opens a fixture issue in the configured dispatch repo containing
/// `<!-- agent_task_metadata {"task_id":"..."} -->`, leaving the task
/// running until a webhook correlates it back.
pub struct GithubIssueDispatchProvider {
    dispatch_repo: String,
    next_issue_number: AtomicI64,
}

impl GithubIssueDispatchProvider {
    pub fn new(dispatch_repo: String) -> Self {
        Self { dispatch_repo, next_issue_number: AtomicI64::new(1) }
    }
}

#[async_trait::async_trait]
impl DispatchProvider for GithubIssueDispatchProvider {
    async fn dispatch(
        &self,
        task_id: &str,
        instruction: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let issue_number = self.next_issue_number.fetch_add(1, Ordering::SeqCst);
        let body = format!(
            "{instruction}\n\n<!-- agent_task_metadata {{\"task_id\":\"{task_id}\"}} -->"
        );
        tracing::info!(
            task_id,
            repo = %self.dispatch_repo,
            issue_number,
            "dispatched agent task as issue"
        );

        let mut trace_delta = HashMap::new();
        trace_delta.insert("dispatched_via".to_owned(), serde_json::json!("github_issue_dispatch"));
        trace_delta.insert("dispatch_repo".to_owned(), serde_json::json!(self.dispatch_repo));
        trace_delta.insert("issue_number".to_owned(), serde_json::json!(issue_number));
        trace_delta.insert("issue_body".to_owned(), serde_json::json!(body));

        Ok(DispatchOutcome { completed_immediately: false, trace_delta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_provider_leaves_task_running_for_later_correlation() {
        let outcome = MockDispatchProvider.dispatch("t1", "do the thing").await.unwrap();
        assert!(!outcome.completed_immediately);
    }

    #[tokio::test]
    async fn github_provider_leaves_task_running_with_metadata() {
        let provider = GithubIssueDispatchProvider::new("org/dispatch".to_owned());
        let outcome = provider.dispatch("t1", "fix the thing").await.unwrap();
        assert!(!outcome.completed_immediately);
        let body = outcome.trace_delta.get("issue_body").unwrap().as_str().unwrap();
        assert!(body.contains("\"task_id\":\"t1\""));
    }
}
