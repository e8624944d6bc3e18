// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-task lifecycle:
//! delegation to an external coding agent provider, and correlation of its
//! result back from a code-host webhook.

pub mod provider;
pub mod service;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTaskState {
    Created,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl AgentTaskState {
    /// Transitions validated per spec §4.12 `UpdateState`: tasks only move
    /// forward, never back into `created`, and terminal states are sticky.
    pub fn can_transition_to(self, next: AgentTaskState) -> bool {
        use AgentTaskState::*;
        matches!(
            (self, next),
            (Created, Running)
                | (Created, Failed)
                | (Created, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: Uuid,
    pub user_id: String,
    pub provider: String,
    pub instruction: String,
    pub state: AgentTaskState,
    pub trace: HashMap<String, serde_json::Value>,
    pub created_at: u64,
    pub updated_at: u64,
}
