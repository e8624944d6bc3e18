// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repo write-policy table. Consulted by write-class
//! handlers before proposing an action. Read-mostly
//! and tiny in practice, so a plain `RwLock<HashMap>` suffices — no TTL, no
//! KV involvement.

use std::collections::HashMap;

use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoPolicy {
    pub allow_write: bool,
}

pub struct RepoPolicyStore {
    policies: RwLock<HashMap<(String, String), RepoPolicy>>,
}

impl RepoPolicyStore {
    pub fn new() -> Self {
        Self { policies: RwLock::new(HashMap::new()) }
    }

    /// Defaults to `allow_write: true` when no explicit policy is on file —
    /// most users never set one, and only the deny path needs to be explicit.
    pub async fn allows_write(&self, user_id: &str, repo_full_name: &str) -> bool {
        let policies = self.policies.read().await;
        policies
            .get(&(user_id.to_owned(), repo_full_name.to_owned()))
            .map(|p| p.allow_write)
            .unwrap_or(true)
    }

    pub async fn set(&self, user_id: &str, repo_full_name: &str, allow_write: bool) {
        self.policies
            .write()
            .await
            .insert((user_id.to_owned(), repo_full_name.to_owned()), RepoPolicy { allow_write });
    }
}

impl Default for RepoPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}
