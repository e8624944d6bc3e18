// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Code-hosting collaborator: pull requests, checks,
//! reviews, review requests, merges. The `Live` mode is a thin placeholder
//! since no real host credentials are configured in this deployment shape;
//! `Fixture` mode carries the sample data the spec's end-to-end scenarios
//! walk through.

use std::collections::HashMap;

use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeHostErrorKind {
    RateLimit,
    Auth,
    NotFound,
}

#[derive(Debug, Clone)]
pub struct CodeHostError {
    pub kind: CodeHostErrorKind,
    pub message: String,
    /// Set only for `RateLimit`, epoch millis the caller should retry after.
    pub reset_at_ms: Option<u64>,
}

impl CodeHostError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self { kind: CodeHostErrorKind::NotFound, message: message.into(), reset_at_ms: None }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self { kind: CodeHostErrorKind::Auth, message: message.into(), reset_at_ms: None }
    }

    pub fn rate_limit(reset_at_ms: u64) -> Self {
        Self {
            kind: CodeHostErrorKind::RateLimit,
            message: "rate limited".to_owned(),
            reset_at_ms: Some(reset_at_ms),
        }
    }
}

impl std::fmt::Display for CodeHostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CodeHostError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
}

#[derive(Debug, Clone)]
pub struct PullRequest {
    pub repo: String,
    pub number: i64,
    pub title: String,
    pub author: String,
    pub is_security: bool,
    pub is_bug: bool,
    pub user_is_reviewer_or_assignee: bool,
    pub updated_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct CheckRun {
    pub name: String,
    pub passing: bool,
}

#[derive(Debug, Clone)]
pub struct Review {
    pub reviewer: String,
    pub state: ReviewState,
}

#[async_trait::async_trait]
pub trait CodeHost: Send + Sync {
    async fn list_user_prs(&self, user_id: &str) -> Result<Vec<PullRequest>, CodeHostError>;
    async fn get_pr(&self, repo: &str, number: i64) -> Result<PullRequest, CodeHostError>;
    async fn get_checks(&self, repo: &str, number: i64) -> Result<Vec<CheckRun>, CodeHostError>;
    async fn get_reviews(&self, repo: &str, number: i64) -> Result<Vec<Review>, CodeHostError>;
    async fn request_review(
        &self,
        repo: &str,
        number: i64,
        reviewer: &str,
    ) -> Result<(), CodeHostError>;
    async fn merge(&self, repo: &str, number: i64) -> Result<(), CodeHostError>;
}

/// In-memory fixture matching the spec's end-to-end scenarios: three PRs in
/// `demo/repo` for the inbox walkthrough (#101 urgent, #102/#103 normal) and
/// PR #412 in `demo/repo` for the confirm-and-merge walkthrough.
pub struct FixtureCodeHost {
    prs: RwLock<HashMap<(String, i64), PullRequest>>,
    checks: RwLock<HashMap<(String, i64), Vec<CheckRun>>>,
    reviews: RwLock<HashMap<(String, i64), Vec<Review>>>,
    merged: RwLock<HashMap<(String, i64), bool>>,
}

impl FixtureCodeHost {
    pub fn new() -> Self {
        let repo = "demo/repo".to_owned();
        let mut prs = HashMap::new();
        prs.insert(
            (repo.clone(), 101),
            PullRequest {
                repo: repo.clone(),
                number: 101,
                title: "Fix auth token refresh race".to_owned(),
                author: "avery".to_owned(),
                is_security: true,
                is_bug: false,
                user_is_reviewer_or_assignee: true,
                updated_at_ms: 3,
            },
        );
        prs.insert(
            (repo.clone(), 102),
            PullRequest {
                repo: repo.clone(),
                number: 102,
                title: "Add pagination to inbox list".to_owned(),
                author: "blair".to_owned(),
                is_security: false,
                is_bug: false,
                user_is_reviewer_or_assignee: true,
                updated_at_ms: 2,
            },
        );
        prs.insert(
            (repo.clone(), 103),
            PullRequest {
                repo: repo.clone(),
                number: 103,
                title: "Bump dependency pins".to_owned(),
                author: "casey".to_owned(),
                is_security: false,
                is_bug: false,
                user_is_reviewer_or_assignee: true,
                updated_at_ms: 1,
            },
        );
        prs.insert(
            (repo.clone(), 412),
            PullRequest {
                repo: repo.clone(),
                number: 412,
                title: "Ship the notification throttle".to_owned(),
                author: "drew".to_owned(),
                is_security: false,
                is_bug: false,
                user_is_reviewer_or_assignee: true,
                updated_at_ms: 4,
            },
        );

        let mut checks = HashMap::new();
        checks.insert(
            (repo.clone(), 101),
            vec![
                CheckRun { name: "unit".to_owned(), passing: true },
                CheckRun { name: "lint".to_owned(), passing: true },
            ],
        );
        checks.insert(
            (repo.clone(), 412),
            vec![
                CheckRun { name: "unit".to_owned(), passing: true },
                CheckRun { name: "integration".to_owned(), passing: true },
                CheckRun { name: "lint".to_owned(), passing: true },
            ],
        );

        let mut reviews = HashMap::new();
        reviews.insert(
            (repo.clone(), 101),
            vec![Review { reviewer: "blair".to_owned(), state: ReviewState::Approved }],
        );
        reviews.insert(
            (repo, 412),
            vec![Review { reviewer: "avery".to_owned(), state: ReviewState::Approved }],
        );

        Self {
            prs: RwLock::new(prs),
            checks: RwLock::new(checks),
            reviews: RwLock::new(reviews),
            merged: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for FixtureCodeHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CodeHost for FixtureCodeHost {
    async fn list_user_prs(&self, _user_id: &str) -> Result<Vec<PullRequest>, CodeHostError> {
        let prs = self.prs.read().await;
        let mut out: Vec<PullRequest> = prs
            .values()
            .filter(|pr| pr.user_is_reviewer_or_assignee && pr.number != 412)
            .cloned()
            .collect();
        out.sort_by_key(|pr| pr.number);
        Ok(out)
    }

    async fn get_pr(&self, repo: &str, number: i64) -> Result<PullRequest, CodeHostError> {
        self.prs
            .read()
            .await
            .get(&(repo.to_owned(), number))
            .cloned()
            .ok_or_else(|| CodeHostError::not_found(format!("PR {number} not found in {repo}")))
    }

    async fn get_checks(&self, repo: &str, number: i64) -> Result<Vec<CheckRun>, CodeHostError> {
        Ok(self.checks.read().await.get(&(repo.to_owned(), number)).cloned().unwrap_or_default())
    }

    async fn get_reviews(&self, repo: &str, number: i64) -> Result<Vec<Review>, CodeHostError> {
        Ok(self.reviews.read().await.get(&(repo.to_owned(), number)).cloned().unwrap_or_default())
    }

    async fn request_review(
        &self,
        repo: &str,
        number: i64,
        _reviewer: &str,
    ) -> Result<(), CodeHostError> {
        self.get_pr(repo, number).await?;
        Ok(())
    }

    async fn merge(&self, repo: &str, number: i64) -> Result<(), CodeHostError> {
        self.get_pr(repo, number).await?;
        self.merged.write().await.insert((repo.to_owned(), number), true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_user_prs_excludes_412_and_sorts_by_number() {
        let host = FixtureCodeHost::new();
        let prs = host.list_user_prs("u1").await.unwrap();
        let numbers: Vec<i64> = prs.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![101, 102, 103]);
    }

    #[tokio::test]
    async fn get_pr_unknown_number_is_not_found() {
        let host = FixtureCodeHost::new();
        let err = host.get_pr("demo/repo", 999).await.unwrap_err();
        assert_eq!(err.kind, CodeHostErrorKind::NotFound);
    }

    #[tokio::test]
    async fn merge_succeeds_for_known_pr() {
        let host = FixtureCodeHost::new();
        assert!(host.merge("demo/repo", 412).await.is_ok());
    }

    #[tokio::test]
    async fn checks_all_passing_for_412() {
        let host = FixtureCodeHost::new();
        let checks = host.get_checks("demo/repo", 412).await.unwrap();
        assert!(checks.iter().all(|c| c.passing));
    }
}
